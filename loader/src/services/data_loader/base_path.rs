// Base path resolution: where the dashboard's CSV files live
use url::Url;

/// What the hosting dashboard knows about its own location.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HostLocation {
    /// Explicit CSV directory; wins over detection when set.
    pub base_url: Option<String>,
    pub page_url: String,
    pub script_urls: Vec<String>,
    pub loader_script: String,
}

impl HostLocation {
    pub fn for_base_url(base_url: impl Into<String>) -> Self {
        HostLocation {
            base_url: Some(base_url.into()),
            ..Default::default()
        }
    }

    pub fn for_page(
        page_url: impl Into<String>,
        script_urls: Vec<String>,
        loader_script: impl Into<String>,
    ) -> Self {
        HostLocation {
            base_url: None,
            page_url: page_url.into(),
            script_urls,
            loader_script: loader_script.into(),
        }
    }
}

/// Resolves the directory CSV filenames are appended to. Always ends with `/`
/// unless nothing at all is known about the host.
///
/// Order: explicit base URL, then the parent of the directory holding the loader
/// script (scripts live in `js/`, data one level up), then the page's directory.
pub fn resolve_base_path(location: &HostLocation) -> String {
    if let Some(base) = location
        .base_url
        .as_deref()
        .map(str::trim)
        .filter(|base| !base.is_empty())
    {
        return with_trailing_slash(base);
    }

    if !location.loader_script.is_empty() {
        let root = location
            .script_urls
            .iter()
            .filter(|src| src.contains(location.loader_script.as_str()))
            .find_map(|src| script_root(src));
        if let Some(root) = root {
            return root;
        }
    }

    page_directory(&location.page_url)
}

fn with_trailing_slash(base: &str) -> String {
    if base.ends_with('/') {
        base.to_string()
    } else {
        format!("{}/", base)
    }
}

fn script_root(src: &str) -> Option<String> {
    if let Ok(url) = Url::parse(src) {
        return url.join("../").ok().map(String::from);
    }
    let script_dir = &src[..src.rfind('/')?];
    let root_end = script_dir.rfind('/')? + 1;
    Some(script_dir[..root_end].to_string())
}

fn page_directory(page_url: &str) -> String {
    if let Ok(url) = Url::parse(page_url) {
        if let Ok(dir) = url.join("./") {
            return dir.into();
        }
    }
    match page_url.rfind('/') {
        Some(pos) => page_url[..=pos].to_string(),
        None => String::new(),
    }
}
