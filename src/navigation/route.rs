use std::fmt;

/// Navigation targets of the client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Login,
    Register,
    Articles,
    ArticleDetail(u64),
    CreateArticle,
    Themes,
    Profile,
}

/// Which guard runs before entering a route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardPolicy {
    Public,
    AuthRequired,
    GuestOnly,
}

impl Route {
    /// Where authenticated users land by default
    pub const LANDING: Route = Route::Articles;

    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Login => "/login".to_string(),
            Route::Register => "/register".to_string(),
            Route::Articles => "/articles".to_string(),
            Route::ArticleDetail(id) => format!("/articles/{}", id),
            Route::CreateArticle => "/articles/create".to_string(),
            Route::Themes => "/themes".to_string(),
            Route::Profile => "/profile".to_string(),
        }
    }

    pub fn parse(path: &str) -> Option<Route> {
        let segments: Vec<&str> = path
            .trim()
            .split('/')
            .filter(|segment| !segment.is_empty())
            .collect();

        match segments.as_slice() {
            [] => Some(Route::Home),
            ["login"] => Some(Route::Login),
            ["register"] => Some(Route::Register),
            ["articles"] => Some(Route::Articles),
            ["articles", "create"] => Some(Route::CreateArticle),
            ["articles", id] => id.parse().ok().map(Route::ArticleDetail),
            ["themes"] => Some(Route::Themes),
            ["profile"] => Some(Route::Profile),
            _ => None,
        }
    }

    pub fn guard_policy(&self) -> GuardPolicy {
        match self {
            Route::Home => GuardPolicy::Public,
            Route::Login | Route::Register => GuardPolicy::GuestOnly,
            Route::Articles
            | Route::ArticleDetail(_)
            | Route::CreateArticle
            | Route::Themes
            | Route::Profile => GuardPolicy::AuthRequired,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}
