use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::{fs, io};

use chrono::Duration;
use ntex::web;
use ntex::web::HttpRequest;
use ntex_files::NamedFile;
use spdlog::{error, info};

use crate::article::Article;
use crate::card::CardView;
use crate::config::{Fields, Server, Site};
use crate::filter::filter_and_sort;
use crate::loader::RecordLoader;
use crate::navigation::{NavState, Navigation};
use crate::paginator::Paginator;
use crate::query_string::QueryString;
use crate::snapshot::{Expire, LoadOutcome, SnapshotStore};
use crate::view::article_renderer::ArticleRenderer;
use crate::view::list_renderer::{ListContext, ListRenderer};

pub const LIST_TEMPLATE: &str = "cards.tpl";
pub const ARTICLE_TEMPLATE: &str = "article.tpl";
pub const ARTICLE_NOT_FOUND: &str = "Article not found";

pub struct SiteState {
    navigation: Navigation,
    loader: RecordLoader,
    store: SnapshotStore,
    list_tpl: String,
    article_tpl: String,
    public_dir: PathBuf,
    page_size: u32,
    utc_offset_minutes: i32,
    no_content_message: String,
}

impl SiteState {
    pub fn new(site: &Site, fields: Fields) -> io::Result<SiteState> {
        let navigation = Navigation::from_config(&site.tabs)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, format!("Invalid tabs: {}", e)))?;
        let loader = RecordLoader::new(&site.proxy_url, fields, site.timeout_secs)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("Error creating HTTP client: {}", e)))?;

        let tpl_dir = &site.paths.template_dir;
        let list_tpl = read_template(tpl_dir, LIST_TEMPLATE)?;
        let article_tpl = read_template(tpl_dir, ARTICLE_TEMPLATE)?;
        // Fail at startup rather than on the first request
        ListRenderer::new(&list_tpl)?;
        ArticleRenderer::new(&article_tpl)?;

        // Twice the refresh period, the background refresh normally replaces it first
        let max_age = Duration::seconds(site.refresh_secs.saturating_mul(2) as i64);

        Ok(SiteState {
            navigation,
            loader,
            store: SnapshotStore::new(Expire::After(max_age)),
            list_tpl,
            article_tpl,
            public_dir: site.paths.public_dir.clone(),
            page_size: site.page_size,
            utc_offset_minutes: site.utc_offset_minutes,
            no_content_message: site.no_content_message.clone(),
        })
    }

    /// Latest stored outcome, loading from the proxy when there is none or a reload is asked.
    async fn current_outcome(&self, reload: bool) -> LoadOutcome {
        if !reload {
            if let Some(outcome) = self.store.get() {
                return outcome;
            }
        }
        self.loader.refresh(&self.store).await
    }

    fn render_cards(&self, nav: NavState, outcome: &LoadOutcome, query: &QueryString) -> io::Result<String> {
        let tabs = self.navigation.tab_links(nav);
        let retry_link = format!("{}?reload=1", self.navigation.active_tab(nav).href());
        let renderer = ListRenderer::new(&self.list_tpl)?;

        let (view, cur_page, page_count) = match outcome {
            LoadOutcome::Failed(message) => (CardView::Failed(message.clone()), 1, 0),
            LoadOutcome::Loaded(snapshot) => {
                let selected = filter_and_sort(snapshot.records(), self.navigation.filter(nav));
                let paginator = Paginator::from(&selected, self.page_size);
                let cur_page = paginator.clamp_page(query.page());
                let page = paginator.get_page(cur_page).unwrap_or(&[]);
                let view = CardView::from_records(page, self.utc_offset_minutes, &self.no_content_message);
                (view, cur_page, paginator.page_count())
            }
        };

        Ok(renderer.render(&tabs, &view, &ListContext {
            cur_page,
            page_count,
            retry_link: &retry_link,
        }))
    }
}

pub fn read_template(tpl_dir: &Path, file_name: &str) -> io::Result<String> {
    let full_path = tpl_dir.join(file_name);
    fs::read_to_string(&full_path)
        .map_err(|e| io::Error::new(e.kind(), format!("Error loading template {}: {}", full_path.display(), e)))
}

fn html_response(mut builder: web::HttpResponseBuilder, body: String) -> web::HttpResponse {
    builder
        .content_type("text/html; charset=utf-8")
        .body(body)
}

fn status_for(outcome: &LoadOutcome) -> web::HttpResponseBuilder {
    match outcome {
        LoadOutcome::Loaded(_) => web::HttpResponse::Ok(),
        LoadOutcome::Failed(_) => web::HttpResponse::BadGateway(),
    }
}

async fn render_tab(req: &HttpRequest, state: &SiteState, nav: NavState) -> web::HttpResponse {
    let query = QueryString::from_optional(req.uri().query());
    let outcome = state.current_outcome(query.reload()).await;

    match state.render_cards(nav, &outcome, &query) {
        Ok(rendered) => html_response(status_for(&outcome), rendered),
        Err(e) => {
            error!("Error rendering card list: {}", e);
            web::HttpResponse::InternalServerError()
                .body(format!("Error listing records: {}", e))
        }
    }
}

// Begin: Redirect region --------
#[web::get("/tab/{key}")]
async fn tab_wo_slash(path: web::types::Path<String>) -> web::HttpResponse {
    web::HttpResponse::TemporaryRedirect()
        .header("Location", format!("/tab/{}/", path.into_inner()))
        .content_type("text/html; charset=utf-8")
        .finish()
}
// End: Redirect region --------

#[web::get("/")]
async fn index(req: HttpRequest, state: web::types::State<Arc<SiteState>>) -> web::HttpResponse {
    let nav = state.navigation.initial();
    render_tab(&req, &state, nav).await
}

#[web::get("/tab/{key}/")]
async fn tab(req: HttpRequest, path: web::types::Path<String>, state: web::types::State<Arc<SiteState>>) -> web::HttpResponse {
    let key = path.into_inner();
    match state.navigation.activate(&key) {
        Some(nav) => render_tab(&req, &state, nav).await,
        None => web::HttpResponse::NotFound()
            .body(format!("Unknown tab {}", key)),
    }
}

#[web::get("/article")]
async fn article(req: HttpRequest, state: web::types::State<Arc<SiteState>>) -> web::HttpResponse {
    let query = QueryString::from_optional(req.uri().query());
    let Some(id) = query.id() else {
        return web::HttpResponse::BadRequest()
            .body("Missing article id");
    };

    let outcome = state.current_outcome(query.reload()).await;
    let snapshot = match outcome {
        LoadOutcome::Loaded(ref snapshot) => snapshot.clone(),
        LoadOutcome::Failed(_) => {
            // The error replaces the article, with the card list layout
            let nav = state.navigation.initial();
            return match state.render_cards(nav, &outcome, &query) {
                Ok(rendered) => html_response(web::HttpResponse::BadGateway(), rendered),
                Err(e) => web::HttpResponse::InternalServerError()
                    .body(format!("Error loading article {}: {}", id, e)),
            };
        }
    };

    let renderer = match ArticleRenderer::new(&state.article_tpl) {
        Ok(renderer) => renderer,
        Err(e) => return web::HttpResponse::InternalServerError()
            .body(format!("Error loading article {}: {}", id, e)),
    };

    let Some(record) = snapshot.find(id) else {
        let nav = state.navigation.initial();
        let back_link = state.navigation.active_tab(nav).href();
        let rendered = renderer.render_not_found(&state.navigation.tab_links(nav), ARTICLE_NOT_FOUND, &back_link);
        return html_response(web::HttpResponse::NotFound(), rendered);
    };

    let nav = state.navigation.state_for_category(&record.category);
    let back_link = state.navigation.active_tab(nav).href();
    match Article::from_record(record, state.utc_offset_minutes) {
        Ok(article) => {
            let rendered = renderer.render(&state.navigation.tab_links(nav), &article, &back_link);
            html_response(web::HttpResponse::Ok(), rendered)
        }
        Err(e) => web::HttpResponse::InternalServerError()
            .body(format!("Error rendering article {}: {}", id, e)),
    }
}

#[web::get("/public/{file_name}")]
async fn public_files(path: web::types::Path<String>, state: web::types::State<Arc<SiteState>>) -> Result<NamedFile, web::Error> {
    if path.contains("../") {
        return Err(web::error::ErrorUnauthorized("Access forbidden").into());
    }

    let file_path = state.public_dir.join(path.into_inner());
    Ok(NamedFile::open(file_path)?)
}

/// Reloads the records every `every`, starting right away.
fn spawn_refresher(state: Arc<SiteState>, every: std::time::Duration) {
    ntex::rt::spawn(async move {
        let mut interval = tokio::time::interval(every);
        loop {
            interval.tick().await;
            state.loader.refresh(&state.store).await;
        }
    });
}

pub async fn server_run(server: &Server, site: &Site, fields: Fields) -> io::Result<()> {
    let state = Arc::new(SiteState::new(site, fields)?);
    info!("Loading records from {} every {} seconds", site.proxy_url, site.refresh_secs);
    spawn_refresher(state.clone(), std::time::Duration::from_secs(site.refresh_secs.max(1)));

    web::HttpServer::new(move || {
        web::App::new()
            .state(state.clone())
            .service(index)
            .service(tab)
            .service(tab_wo_slash)
            .service(article)
            .service(public_files)
    })
        .bind((server.address.clone(), server.port))?
        .run()
        .await
}
