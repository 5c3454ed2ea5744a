//! Request headers for page fetches.

use reqwest::header::{HeaderName, ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, REFERER};

/// Browser-like request headers.
///
/// Gallery hosts often gate the paginated views behind a Referer check
/// (hotlink protection) and serve a stripped page to requests that do not
/// look like in-site navigation, so every fetch looks like a click on the
/// pagination link of the host page.
pub(crate) struct RequestHeaders;

impl RequestHeaders {
    /// Applies the standard headers, with `referer` set to the host page when known.
    pub(crate) fn apply_to_request_builder(
        builder: reqwest::RequestBuilder,
        referer: Option<&str>,
    ) -> reqwest::RequestBuilder {
        let builder = builder
            .header(
                ACCEPT,
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
            )
            .header(ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .header(HeaderName::from_static("sec-fetch-dest"), "document")
            .header(HeaderName::from_static("sec-fetch-mode"), "navigate")
            .header(HeaderName::from_static("sec-fetch-site"), "same-origin")
            .header(CACHE_CONTROL, "max-age=0");
        match referer {
            Some(referer) => builder.header(REFERER, referer),
            None => builder,
        }
    }
}
