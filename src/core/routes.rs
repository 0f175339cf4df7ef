//! Client route table
//!
//! | Path | Route |
//! |------|-------|
//! | `/` | Home |
//! | `/index` | Index (landing) |
//! | `/blogs` | Blogs |
//! | `/albums` | Albums |
//! | `/albums/:id` | AlbumDetail |
//! | `/publish` | Publish |
//! | `/blog/:id` | BlogDetail |
//! | `/subscribe` | Subscribe |

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Index,
    Blogs,
    Albums,
    AlbumDetail { id: String },
    Publish,
    BlogDetail { id: String },
    Subscribe,
}

impl Route {
    /// Match a history-mode path (no `#`). Query string and trailing slash are ignored.
    pub fn resolve(path: &str) -> Option<Self> {
        let path = path.split(['?', '#']).next().unwrap_or("");
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        Some(match segments.as_slice() {
            [] => Route::Home,
            ["index"] => Route::Index,
            ["blogs"] => Route::Blogs,
            ["albums"] => Route::Albums,
            ["albums", id] => Route::AlbumDetail { id: (*id).to_string() },
            ["publish"] => Route::Publish,
            ["blog", id] => Route::BlogDetail { id: (*id).to_string() },
            ["subscribe"] => Route::Subscribe,
            _ => return None,
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Route::Home => "Home",
            Route::Index => "Index",
            Route::Blogs => "Blogs",
            Route::Albums => "Albums",
            Route::AlbumDetail { .. } => "AlbumDetail",
            Route::Publish => "Publish",
            Route::BlogDetail { .. } => "BlogDetail",
            Route::Subscribe => "Subscribe",
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".into(),
            Route::Index => "/index".into(),
            Route::Blogs => "/blogs".into(),
            Route::Albums => "/albums".into(),
            Route::AlbumDetail { id } => format!("/albums/{}", id),
            Route::Publish => "/publish".into(),
            Route::BlogDetail { id } => format!("/blog/{}", id),
            Route::Subscribe => "/subscribe".into(),
        }
    }

    pub fn blog(id: u128) -> Self { Route::BlogDetail { id: id.to_string() } }
}
