//! HTTP server: listing search pages, the blog and a JSON listing API

use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::{header::ACCEPT_LANGUAGE, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Json, Router,
};
use percent_encoding::utf8_percent_encode;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tera::Context;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::content::{filter_by_category, CategoryFilter, ContentLoader, MarkdownRenderer};
use crate::i18n::{I18n, Language};
use crate::listing::{FilterParams, Listing, ListingCollection, QUERY_VALUE};
use crate::templates::{self, TemplateRenderer};
use crate::Site;

/// Server state, built once at startup and shared read-only
pub struct AppState {
    pub site: Site,
    pub listings: ListingCollection,
    pub loader: ContentLoader,
    pub renderer: MarkdownRenderer,
    pub i18n: I18n,
    pub templates: TemplateRenderer,
}

impl AppState {
    pub fn new(site: Site) -> crate::Result<Self> {
        let listings = site.listings()?;
        tracing::info!("Loaded {} listings", listings.len());

        Ok(Self {
            listings,
            loader: site.content_loader(),
            renderer: site.renderer(),
            i18n: site.i18n()?,
            templates: TemplateRenderer::new()?,
            site,
        })
    }

    /// `lang` query parameter, then `Accept-Language`, then the configured default
    fn language(&self, param: Option<&str>, headers: &HeaderMap) -> Language {
        let accept = headers
            .get(ACCEPT_LANGUAGE)
            .and_then(|value| value.to_str().ok());
        Language::negotiate(param, accept, self.site.default_language())
    }

    fn render(&self, template: &str, context: &Context) -> Response {
        match self.templates.render(template, context) {
            Ok(html) => Html(html).into_response(),
            Err(e) => {
                tracing::error!("Failed to render {}: {}", template, e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response()
            }
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LangQuery {
    lang: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct BlogQuery {
    lang: Option<String>,
    category: Option<String>,
}

#[derive(Debug, Serialize)]
struct ListingsResponse<'a> {
    count: usize,
    listings: Vec<&'a Listing>,
}

#[derive(Debug, Serialize)]
struct SearchForm {
    location: String,
    beds: String,
    min_price: String,
    max_price: String,
    types: String,
}

/// Build the application router
pub fn router(state: Arc<AppState>) -> Router {
    let blog_index = state.site.config.blog_index.clone();
    let content_dir = state.site.content_dir.clone();

    Router::new()
        .route("/", get(home_handler))
        .route("/buy", get(buy_handler))
        .route("/api/listings", get(api_listings_handler))
        .route(&blog_index, get(blog_index_handler))
        .route(&format!("{}/:slug", blog_index), get(blog_article_handler))
        .nest_service("/content", ServeDir::new(content_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the server
pub async fn start(site: Site, ip: &str, port: u16, open: bool) -> Result<()> {
    let state = Arc::new(AppState::new(site)?);
    let app = router(state);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let url = format!("http://{}:{}", ip, port);
    println!("Server running at {}", url);
    println!("Press Ctrl+C to stop.");

    if open {
        if let Err(e) = open_browser(&url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn home_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LangQuery>,
    headers: HeaderMap,
) -> Response {
    let lang = state.language(query.lang.as_deref(), &headers);
    let config = &state.site.config;

    let recent = state.listings.recent(config.recent_limit);
    let manifest = state.loader.load_manifest(lang).await;
    let latest: Vec<_> = manifest.iter().take(config.latest_posts).collect();

    let mut context = templates::base_context(config, &state.i18n, lang, "/", "home");
    context.insert(
        "listings",
        &templates::listing_cards(&recent, &state.i18n, lang),
    );
    context.insert(
        "posts",
        &templates::post_cards(&latest, &config.blog_index, &state.i18n, lang),
    );
    state.render("home.html", &context)
}

async fn buy_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FilterParams>,
    Query(query): Query<LangQuery>,
    headers: HeaderMap,
) -> Response {
    let lang = state.language(query.lang.as_deref(), &headers);
    let config = &state.site.config;
    let price_error = params.price_error().map(|e| e.to_string());
    let filters = params.into_filters(config.price_ceiling);

    let results = state.listings.search(&filters);
    tracing::debug!("Search {:?} matched {} listings", filters, results.len());

    let encoded = filters.to_query();
    let current_path = if encoded.is_empty() {
        "/buy".to_string()
    } else {
        format!("/buy?{}", encoded)
    };

    let form = SearchForm {
        location: filters.location.clone(),
        beds: filters.beds.as_param().unwrap_or_default(),
        min_price: filters
            .price
            .filter(|p| p.min > 0)
            .map(|p| p.min.to_string())
            .unwrap_or_default(),
        max_price: filters
            .price
            .filter(|p| p.max < config.price_ceiling)
            .map(|p| p.max.to_string())
            .unwrap_or_default(),
        types: filters.types.iter().cloned().collect::<Vec<_>>().join(","),
    };

    let mut context = templates::base_context(config, &state.i18n, lang, &current_path, "buy");
    context.insert("form", &form);
    context.insert("price_error", &price_error);
    context.insert("bed_options", &["1", "2", "3+"]);
    context.insert("chips", &filters.chips(config.price_ceiling));
    context.insert(
        "results_label",
        &state.i18n.get_plural(lang, "buy.results", results.len()),
    );
    context.insert(
        "listings",
        &templates::listing_cards(&results, &state.i18n, lang),
    );
    state.render("buy.html", &context)
}

async fn api_listings_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FilterParams>,
) -> impl IntoResponse {
    let filters = params.into_filters(state.site.config.price_ceiling);
    let listings = state.listings.search(&filters);
    Json(ListingsResponse {
        count: listings.len(),
        listings,
    })
    .into_response()
}

async fn blog_index_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<BlogQuery>,
    headers: HeaderMap,
) -> Response {
    let lang = state.language(query.lang.as_deref(), &headers);
    let config = &state.site.config;
    let selected = query
        .category
        .as_deref()
        .map(CategoryFilter::parse)
        .unwrap_or_default();

    let manifest = state.loader.load_manifest(lang).await;
    let posts = filter_by_category(&manifest, selected);

    let current_path = match selected {
        CategoryFilter::All => config.blog_index.clone(),
        CategoryFilter::Only(_) => format!("{}?category={}", config.blog_index, selected.as_str()),
    };

    let mut context = templates::base_context(config, &state.i18n, lang, &current_path, "blog");
    context.insert(
        "categories",
        &templates::category_tabs(selected, &config.blog_index, &state.i18n, lang),
    );
    context.insert(
        "posts",
        &templates::post_cards(&posts, &config.blog_index, &state.i18n, lang),
    );
    state.render("blog.html", &context)
}

async fn blog_article_handler(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    Query(query): Query<LangQuery>,
    headers: HeaderMap,
) -> Response {
    let lang = state.language(query.lang.as_deref(), &headers);
    let config = &state.site.config;

    let view = match state.loader.load_view(lang, &slug).await {
        Ok(view) => view,
        Err(e) => {
            if e.is_not_found() {
                tracing::debug!("Article {} not found", slug);
            } else {
                tracing::warn!("Failed to load article {}: {}", slug, e);
            }
            return Redirect::to(&config.blog_index).into_response();
        }
    };

    let current_path = format!(
        "{}/{}",
        config.blog_index,
        utf8_percent_encode(&view.slug, QUERY_VALUE)
    );
    let title = view
        .article
        .title
        .clone()
        .or_else(|| view.meta.as_ref().and_then(|m| m.title.clone()));
    let category_label = view
        .meta
        .as_ref()
        .and_then(|m| m.category)
        .map(|c| state.i18n.get(lang, &c.label_key()));

    let mut context = templates::base_context(config, &state.i18n, lang, &current_path, "blog");
    context.insert("title", &title);
    context.insert("meta", &view.meta);
    context.insert("category_label", &category_label);
    context.insert("heading_class", &config.styles.h1);
    context.insert("content", &state.renderer.render(&view.article.body));
    state.render("article.html", &context)
}

/// Open a URL in the default browser
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(url).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(url).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/c", "start", url])
            .spawn()?;
    }

    Ok(())
}
