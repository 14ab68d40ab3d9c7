mod dashboard;
mod login;
mod resident_detail;
mod residents;
mod unauthorized;

pub use dashboard::DashboardView;
pub use login::LoginView;
pub use resident_detail::ResidentDetailView;
pub use residents::ResidentsView;
pub use unauthorized::UnauthorizedView;
