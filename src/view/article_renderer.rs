use std::io;
use std::io::ErrorKind;

use ramhorns::Template;

use crate::article::Article;
use crate::navigation::TabLink;
use crate::view::list_renderer::{ViewCover, ViewTab};

#[derive(ramhorns::Content)]
struct ViewArticle<'a> {
    tabs: Vec<ViewTab<'a>>,
    id: &'a str,
    date: &'a str,
    cover: Option<ViewCover<'a>>,
    post_title: &'a str,
    post_content: &'a str,
    back_link: &'a str,
}

#[derive(ramhorns::Content)]
struct ViewNotFound<'a> {
    tabs: Vec<ViewTab<'a>>,
    not_found: bool,
    post_title: &'a str,
    back_link: &'a str,
}

pub struct ArticleRenderer<'a> {
    pub template: Template<'a>,
}

impl ArticleRenderer<'_> {
    pub fn new(article_tpl_src: &str) -> io::Result<ArticleRenderer> {
        let template = match Template::new(article_tpl_src) {
            Ok(x) => x,
            Err(e) => {
                return Err(io::Error::new(ErrorKind::InvalidInput, format!("Error parsing article template: {}", e)));
            }
        };

        Ok(ArticleRenderer {
            template,
        })
    }

    pub fn render(&self, tabs: &[TabLink], article: &Article, back_link: &str) -> String {
        self.template.render(&ViewArticle {
            tabs: ViewTab::from_links(tabs),
            id: article.id.as_str(),
            date: article.date.as_str(),
            cover: ViewCover::from_cover(&article.cover),
            post_title: article.title.as_str(),
            post_content: article.content.as_str(),
            back_link,
        })
    }

    pub fn render_not_found(&self, tabs: &[TabLink], message: &str, back_link: &str) -> String {
        self.template.render(&ViewNotFound {
            tabs: ViewTab::from_links(tabs),
            not_found: true,
            post_title: message,
            back_link,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::card::Cover;

    use super::*;

    const TEMPLATE: &str = "TITLE=[{{post_title}}];DATE=[{{date}}];\
COVER=[{{#cover}}{{url}} {{alt}}{{/cover}}];\
CONTENT=[{{{post_content}}}];\
MISSING=[{{#not_found}}yes{{/not_found}}];\
BACK=[{{back_link}}]";

    #[test]
    fn render_article() {
        let renderer = ArticleRenderer::new(TEMPLATE).unwrap();
        let article = Article {
            id: "rec1".to_string(),
            title: "<Hello>".to_string(),
            date: "2024-01-02".to_string(),
            cover: Some(Cover { url: "https://x/c.png".to_string(), alt: "Hello".to_string() }),
            content: "<p>Body</p>".to_string(),
        };
        let res = renderer.render(&[], &article, "/tab/blog/");
        assert_eq!(res, "TITLE=[&lt;Hello&gt;];DATE=[2024-01-02];\
COVER=[https://x/c.png Hello];\
CONTENT=[<p>Body</p>];\
MISSING=[];\
BACK=[/tab/blog/]");
    }

    #[test]
    fn render_not_found() {
        let renderer = ArticleRenderer::new(TEMPLATE).unwrap();
        let res = renderer.render_not_found(&[], "Article not found", "/");
        assert_eq!(res, "TITLE=[Article not found];DATE=[];COVER=[];CONTENT=[];MISSING=[yes];BACK=[/]");
    }
}
