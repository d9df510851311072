//! Request paths understood by the gateway

/// A lookup requested through the URL path
#[derive(Debug, PartialEq, Eq)]
pub enum Lookup<'a> {
    /// `/{application}/{service}`
    ByService { app: &'a str, service: &'a str },
    /// `/{application}/{service}/{entry}`
    ByEntry {
        app: &'a str,
        service: &'a str,
        entry: &'a str,
    },
}

/// Parse a request path into a lookup; trailing slashes are ignored
pub fn parse_path(path: &str) -> Option<Lookup<'_>> {
    let segments: Vec<&str> = path.trim_matches('/').split('/').collect();
    if segments.iter().any(|s| s.is_empty()) {
        return None;
    }

    match *segments.as_slice() {
        [app, service] => Some(Lookup::ByService { app, service }),
        [app, service, entry] => Some(Lookup::ByEntry {
            app,
            service,
            entry,
        }),
        _ => None,
    }
}
