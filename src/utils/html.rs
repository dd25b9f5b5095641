// src/utils/html.rs

/// Sanitizes rich text supplied through the admin panel before storage.
///
/// Subject and chapter descriptions and question statements may carry
/// light markup (<b>, <p>, lists). Ammonia keeps that whitelist and
/// strips script tags, iframes and event-handler attributes, so stored
/// content is safe to render verbatim in any client.
pub fn sanitize_rich_text(input: &str) -> String {
    ammonia::clean(input)
}
