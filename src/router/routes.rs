//! Top-level route table

pub const LOGIN_PATH: &str = "/login";
pub const REGISTER_PATH: &str = "/register";
pub const APPROVE_PATH: &str = "/approve";

/// Where a path lands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// The guarded application tree under `/`
    Home { path: String },
    /// Token-bearing approval link, guarded
    Approve,
    /// Public authentication pages
    Login,
    Register,
    /// Not an app-relative path; goes back to the default route
    Redirect(String),
}

impl Route {
    pub fn resolve(path: &str) -> Self {
        let path = path.split(|c: char| c == '?' || c == '#').next().unwrap_or_default();
        let trimmed = path.trim_end_matches('/');

        match trimmed {
            LOGIN_PATH => Route::Login,
            REGISTER_PATH => Route::Register,
            APPROVE_PATH => Route::Approve,
            "" => Route::Home {
                path: "/".to_string(),
            },
            p if p.starts_with('/') && !p.starts_with("//") => Route::Home {
                path: p.to_string(),
            },
            _ => Route::Redirect("/".to_string()),
        }
    }

    /// Whether the route guard must run before entering
    pub fn is_guarded(&self) -> bool {
        matches!(self, Route::Home { .. } | Route::Approve)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_known_routes() {
        assert_eq!(Route::resolve("/"), Route::Home { path: "/".into() });
        assert_eq!(Route::resolve(""), Route::Home { path: "/".into() });
        assert_eq!(Route::resolve("/login"), Route::Login);
        assert_eq!(Route::resolve("/register/"), Route::Register);
        assert_eq!(Route::resolve("/approve?token=x"), Route::Approve);
        assert_eq!(
            Route::resolve("/vehicles/42"),
            Route::Home {
                path: "/vehicles/42".into()
            }
        );
    }

    #[test]
    fn test_any_app_path_is_in_home_tree() {
        assert_eq!(
            Route::resolve("/estimates/3"),
            Route::Home {
                path: "/estimates/3".into()
            }
        );
        assert!(Route::resolve("/estimates").is_guarded());
        assert!(!Route::resolve("/login/").is_guarded());
    }

    #[test]
    fn test_non_relative_paths_redirect_home() {
        assert_eq!(Route::resolve("vehicles"), Route::Redirect("/".into()));
        assert_eq!(
            Route::resolve("https://evil.example/x"),
            Route::Redirect("/".into())
        );
        assert_eq!(Route::resolve("//evil.example"), Route::Redirect("/".into()));
    }

    #[test]
    fn test_guarded_routes() {
        assert!(Route::resolve("/").is_guarded());
        assert!(Route::resolve("/approve").is_guarded());
        assert!(!Route::resolve("/login").is_guarded());
        assert!(Route::resolve("/elsewhere").is_guarded());
        assert!(!Route::resolve("elsewhere").is_guarded());
    }
}
