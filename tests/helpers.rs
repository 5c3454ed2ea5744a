// Shared test helpers: gallery page markup and mock server setup.

use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Path of page `n` of the test gallery post (page 1 is the post itself).
pub fn page_path(n: u32) -> String {
    if n == 1 {
        "/gallery/post/".to_string()
    } else {
        format!("/gallery/post/{n}/")
    }
}

/// A gallery post page with three lazy images and numbered navigation.
pub fn gallery_page(current: u32, total: u32) -> String {
    let images: String = (1..=3)
        .map(|i| {
            format!(
                r#"<p><img class="aligncenter lazy" src="data:image/gif;base64,R0lGOD" data-src="https://cdn.test/{current}-{i}.jpg"></p>"#
            )
        })
        .collect();
    let navigation: String = (1..=total)
        .map(|n| {
            if n == current {
                format!(r#"<span class="post-page-numbers current">{n}</span>"#)
            } else {
                format!(r#"<a class="post-page-numbers" href="{}">{n}</a>"#, page_path(n))
            }
        })
        .collect();
    format!(
        r#"<!DOCTYPE html>
<html><head><title>Gallery post</title></head>
<body>
  <header><h1>Gallery post</h1><nav class="menu"><a href="/">Home</a></nav></header>
  <div class="entry">
    {images}
    <div class="e3lan">advert</div>
    <div class="page-link">{navigation}</div>
  </div>
  <footer>footer</footer>
</body></html>"#
    )
}

/// Serves page `n` exactly once, and only to requests carrying the post as referer.
#[allow(dead_code)] // Not every test file uses every helper
pub async fn mount_page(server: &MockServer, n: u32, total: u32) {
    Mock::given(method("GET"))
        .and(path(page_path(n)))
        .and(header("referer", format!("{}{}", server.uri(), page_path(1)).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_string(gallery_page(n, total)))
        .expect(1)
        .mount(server)
        .await;
}

/// Serves the start page (no referer expected).
#[allow(dead_code)]
pub async fn mount_start_page(server: &MockServer, total: u32) {
    Mock::given(method("GET"))
        .and(path(page_path(1)))
        .respond_with(ResponseTemplate::new(200).set_body_string(gallery_page(1, total)))
        .expect(1)
        .mount(server)
        .await;
}
