use axum::response::Html;

pub async fn index() -> Html<&'static str> {
    Html(
        "<!DOCTYPE html>\n<html><head><title>Chat</title></head><body><div id=\"chat\"></div></body></html>\n",
    )
}
