use axum::{extract::State, response::Html};

use crate::{web::WebResult, AppState};

pub async fn home(State(app_state): State<AppState>) -> WebResult<Html<String>> {
    let mut ctx = tera::Context::new();
    ctx.insert("base_url", &app_state.base_url);

    let body = app_state
        .templ_mgr
        .render_html_to_string(&ctx, "home.html")?;

    Ok(Html(body))
}
