//! Role-based routing between the app's top-level screens.

use crate::api::User;

/// Top-level screens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
  Login,
  /// Residents administration; admins only
  Admin,
  /// Regular user dashboard; non-admins only
  User,
  Unauthorized,
}

impl Route {
  pub fn title(&self) -> &'static str {
    match self {
      Route::Login => "Login",
      Route::Admin => "Residents",
      Route::User => "Dashboard",
      Route::Unauthorized => "Unauthorized",
    }
  }

  /// Parse a `:command` target
  pub fn from_command(name: &str) -> Option<Route> {
    match name {
      "residents" | "admin" => Some(Route::Admin),
      "dashboard" | "home" => Some(Route::User),
      _ => None,
    }
  }
}

/// Landing screen for a signed-in user (or login when signed out)
pub fn home_for(user: Option<&User>) -> Route {
  match user {
    None => Route::Login,
    Some(u) if u.is_admin => Route::Admin,
    Some(_) => Route::User,
  }
}

/// Where a request for `requested` actually ends up for `user`
pub fn resolve(requested: Route, user: Option<&User>) -> Route {
  let Some(u) = user else {
    return match requested {
      Route::Unauthorized => Route::Unauthorized,
      _ => Route::Login,
    };
  };

  match requested {
    Route::Login => home_for(user),
    Route::Admin if u.is_admin => Route::Admin,
    Route::User if !u.is_admin => Route::User,
    Route::Admin | Route::User | Route::Unauthorized => Route::Unauthorized,
  }
}
