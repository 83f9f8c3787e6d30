use std::io;
use std::io::ErrorKind;

use ramhorns::Template;

use crate::card::{Card, CardView, Cover};
use crate::navigation::TabLink;

#[derive(ramhorns::Content)]
pub(crate) struct ViewTab<'a> {
    pub key: &'a str,
    pub label: &'a str,
    pub href: &'a str,
    pub active: bool,
}

impl<'a> ViewTab<'a> {
    pub fn from_links(links: &'a [TabLink]) -> Vec<ViewTab<'a>> {
        links.iter()
            .map(|link| ViewTab {
                key: link.key.as_str(),
                label: link.label.as_str(),
                href: link.href.as_str(),
                active: link.active,
            })
            .collect()
    }
}

#[derive(ramhorns::Content)]
pub(crate) struct ViewCover<'a> {
    pub url: &'a str,
    pub alt: &'a str,
}

impl<'a> ViewCover<'a> {
    pub fn from_cover(cover: &'a Option<Cover>) -> Option<ViewCover<'a>> {
        cover.as_ref().map(|cover| ViewCover {
            url: cover.url.as_str(),
            alt: cover.alt.as_str(),
        })
    }
}

#[derive(ramhorns::Content)]
struct ViewCard<'a> {
    title: &'a str,
    category: &'a str,
    date: &'a str,
    preview: &'a str,
    link: &'a str,
    cover: Option<ViewCover<'a>>,
}

#[derive(ramhorns::Content)]
struct ViewMessage<'a> {
    message: &'a str,
}

#[derive(ramhorns::Content)]
struct ViewFailure<'a> {
    message: &'a str,
    retry_link: &'a str,
}

#[derive(ramhorns::Content)]
struct ViewPagination {
    current: bool,
    number: u32,
}

#[derive(ramhorns::Content)]
struct ListPage<'a> {
    tabs: Vec<ViewTab<'a>>,
    card_list: Vec<ViewCard<'a>>,
    empty: Option<ViewMessage<'a>>,
    error: Option<ViewFailure<'a>>,
    page_list: Vec<ViewPagination>,
    show_pagination: bool,
}

/// Which page of the card list is shown, and where retry sends the user.
pub struct ListContext<'a> {
    pub cur_page: u32,
    pub page_count: u32,
    pub retry_link: &'a str,
}

pub struct ListRenderer<'a> {
    pub template: Template<'a>,
}

impl ListRenderer<'_> {
    pub fn new(list_tpl_src: &str) -> io::Result<ListRenderer> {
        let template = match Template::new(list_tpl_src) {
            Ok(x) => x,
            Err(e) => {
                return Err(io::Error::new(ErrorKind::InvalidInput, format!("Error parsing card list template: {}", e)));
            }
        };

        Ok(ListRenderer {
            template,
        })
    }

    pub fn render(&self, tabs: &[TabLink], view: &CardView, ctx: &ListContext) -> String {
        let mut card_list = vec![];
        let mut empty = None;
        let mut error = None;

        match view {
            CardView::Cards(cards) => card_list = cards.iter().map(view_card).collect(),
            CardView::Empty(message) => empty = Some(ViewMessage { message: message.as_str() }),
            CardView::Failed(message) => error = Some(ViewFailure {
                message: message.as_str(),
                retry_link: ctx.retry_link,
            }),
        }

        let page_list: Vec<ViewPagination> = (1..=ctx.page_count)
            .map(|number| ViewPagination {
                current: number == ctx.cur_page,
                number,
            })
            .collect();

        self.template.render(&ListPage {
            tabs: ViewTab::from_links(tabs),
            card_list,
            empty,
            error,
            show_pagination: page_list.len() > 1,
            page_list,
        })
    }
}

fn view_card(card: &Card) -> ViewCard {
    ViewCard {
        title: card.title.as_str(),
        category: card.category.as_str(),
        date: card.date.as_str(),
        preview: card.preview.as_str(),
        link: card.detail_link.as_str(),
        cover: ViewCover::from_cover(&card.cover),
    }
}
