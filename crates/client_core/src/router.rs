use std::fmt;

use shared::domain::EmployeeId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    List,
    Create,
    Edit(EmployeeId),
    /// Keeps the unmatched path for display.
    NotFound(String),
}

impl Route {
    /// Resolves a navigation path. An empty path redirects to `/home`.
    pub fn parse(path: &str) -> Self {
        let trimmed = path.trim().trim_matches('/');
        let segments: Vec<&str> = trimmed.split('/').collect();
        match segments.as_slice() {
            [""] | ["home"] => Self::Home,
            ["list"] => Self::List,
            ["create"] => Self::Create,
            ["edit", id] => match id.parse::<i64>() {
                Ok(id) => Self::Edit(EmployeeId(id)),
                Err(_) => Self::NotFound(format!("/{trimmed}")),
            },
            _ => Self::NotFound(format!("/{trimmed}")),
        }
    }

    pub fn path(&self) -> String {
        match self {
            Self::Home => "/home".to_string(),
            Self::List => "/list".to_string(),
            Self::Create => "/create".to_string(),
            Self::Edit(id) => format!("/edit/{id}"),
            Self::NotFound(path) => path.clone(),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_paths_resolve() {
        assert_eq!(Route::parse("/home"), Route::Home);
        assert_eq!(Route::parse("list"), Route::List);
        assert_eq!(Route::parse("/create/"), Route::Create);
        assert_eq!(Route::parse("/edit/42"), Route::Edit(EmployeeId(42)));
    }

    #[test]
    fn empty_path_redirects_home() {
        assert_eq!(Route::parse(""), Route::Home);
        assert_eq!(Route::parse("/"), Route::Home);
    }

    #[test]
    fn unmatched_paths_are_not_found() {
        assert_eq!(
            Route::parse("/edit/abc"),
            Route::NotFound("/edit/abc".into())
        );
        assert_eq!(
            Route::parse("/edit"),
            Route::NotFound("/edit".into())
        );
        assert_eq!(
            Route::parse("/reports/2024"),
            Route::NotFound("/reports/2024".into())
        );
    }

    #[test]
    fn routes_render_canonical_paths() {
        for path in ["/home", "/list", "/create", "/edit/3"] {
            assert_eq!(Route::parse(path).path(), path);
        }
        assert_eq!(Route::Edit(EmployeeId(9)).to_string(), "/edit/9");
    }
}
