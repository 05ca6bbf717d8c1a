//! Static HTML page for an interactive API explorer.
//!
//! The page loads Swagger UI from a CDN and points it at `spec_url`. Serving
//! the page and the document is left to whatever routing layer hosts the API.

/// Swagger UI distribution loaded by the page
const SWAGGER_UI_DIST: &str = "https://unpkg.com/swagger-ui-dist@5";

/// Render the explorer page for the document published at `spec_url`.
pub fn swagger_ui_html(spec_url: &str, title: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <title>{title} - API Docs</title>
  <meta charset="utf-8"/>
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <link rel="stylesheet" href="{dist}/swagger-ui.css">
  <style>
    body {{ margin: 0; }}
    .topbar {{ display: none; }}
  </style>
</head>
<body>
<div id="swagger-ui"></div>
<script src="{dist}/swagger-ui-bundle.js"></script>
<script>
  SwaggerUIBundle({{
    url: "{spec_url}",
    dom_id: '#swagger-ui',
    presets: [
      SwaggerUIBundle.presets.apis,
      SwaggerUIBundle.SwaggerUIStandalonePreset
    ],
    layout: "BaseLayout",
    deepLinking: true,
    displayRequestDuration: true,
    filter: true,
    persistAuthorization: true,
    tryItOutEnabled: true,
    docExpansion: "list",
    defaultModelsExpandDepth: 3,
  }})
</script>
</body>
</html>
"#,
        title = escape_html(title),
        dist = SWAGGER_UI_DIST,
        spec_url = escape_js(spec_url),
    )
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn escape_js(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('<', "\\u003c")
}
