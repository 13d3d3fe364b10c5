//! Dashboard shell: session check, login/logout and navigation

use crate::context::{Context, Outcome};
use std::fmt;
use std::str::FromStr;
use storedesk_client::{ClientError, SessionState};
use storedesk_core::forms::LoginRequest;
use storedesk_core::{AdminProfile, EntityId};

/// Terminal width at which the sidebar starts open
pub const WIDE_COLUMNS: u16 = 100;

/// Dashboard pages
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Analytics home
    Dashboard,
    /// New product form and bulk ingestion
    AddProduct,
    /// Product list
    ViewProducts,
    /// Edit one product
    EditProduct(EntityId),
    /// Orders
    Orders,
    /// Customers
    Customers,
    /// Coupons
    Coupons,
    /// Staff
    Staff,
    /// Shipping zones
    ShippingLocations,
    /// New shipping zone
    AddShippingLocation,
    /// States derived from zones
    ShippingStates,
    /// Login form
    Login,
}

impl Route {
    /// Whether the route lives under the shipping sub-menu
    #[must_use]
    pub const fn is_shipping(&self) -> bool {
        matches!(
            self,
            Self::ShippingLocations | Self::AddShippingLocation | Self::ShippingStates
        )
    }

    /// Path the page had in the browser layout
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Dashboard => "/dashboard".to_string(),
            Self::AddProduct => "/dashboard/add-product".to_string(),
            Self::ViewProducts => "/dashboard/view-products".to_string(),
            Self::EditProduct(id) => format!("/dashboard/edit-product/{id}"),
            Self::Orders => "/dashboard/orders".to_string(),
            Self::Customers => "/dashboard/customers".to_string(),
            Self::Coupons => "/dashboard/coupons".to_string(),
            Self::Staff => "/dashboard/staff".to_string(),
            Self::ShippingLocations => "/dashboard/shipping/locations".to_string(),
            Self::AddShippingLocation => "/dashboard/shipping/locations/add".to_string(),
            Self::ShippingStates => "/dashboard/shipping/states".to_string(),
            Self::Login => "/login".to_string(),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dashboard => f.write_str("dashboard"),
            Self::AddProduct => f.write_str("add-product"),
            Self::ViewProducts => f.write_str("products"),
            Self::EditProduct(id) => write!(f, "edit-product {id}"),
            Self::Orders => f.write_str("orders"),
            Self::Customers => f.write_str("customers"),
            Self::Coupons => f.write_str("coupons"),
            Self::Staff => f.write_str("staff"),
            Self::ShippingLocations => f.write_str("shipping"),
            Self::AddShippingLocation => f.write_str("add-shipping"),
            Self::ShippingStates => f.write_str("states"),
            Self::Login => f.write_str("login"),
        }
    }
}

impl FromStr for Route {
    type Err = storedesk_core::Error;

    fn from_str(s: &str) -> storedesk_core::Result<Self> {
        let s = s.trim();
        let (name, arg) = s
            .split_once(char::is_whitespace)
            .map_or((s, ""), |(name, arg)| (name, arg.trim()));
        match (name.to_ascii_lowercase().as_str(), arg) {
            ("dashboard" | "home", "") => Ok(Self::Dashboard),
            ("add-product", "") => Ok(Self::AddProduct),
            ("products" | "view-products", "") => Ok(Self::ViewProducts),
            ("edit-product", id) if !id.is_empty() => Ok(Self::EditProduct(id.to_string())),
            ("orders", "") => Ok(Self::Orders),
            ("customers", "") => Ok(Self::Customers),
            ("coupons", "") => Ok(Self::Coupons),
            ("staff", "") => Ok(Self::Staff),
            ("shipping" | "locations", "") => Ok(Self::ShippingLocations),
            ("add-shipping", "") => Ok(Self::AddShippingLocation),
            ("states", "") => Ok(Self::ShippingStates),
            ("login", "") => Ok(Self::Login),
            _ => Err(storedesk_core::Error::validation(
                "route",
                format!("Unknown page '{s}'"),
            )),
        }
    }
}

/// Cosmetic navigation state; never persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    route: Route,
    sidebar_open: bool,
    shipping_menu_open: bool,
}

impl Navigation {
    /// Start on the dashboard; the sidebar is open on wide terminals
    #[must_use]
    pub const fn new(columns: u16) -> Self {
        Self {
            route: Route::Dashboard,
            sidebar_open: columns >= WIDE_COLUMNS,
            shipping_menu_open: false,
        }
    }

    /// Active route
    #[must_use]
    pub const fn route(&self) -> &Route {
        &self.route
    }

    /// Whether the sidebar is shown
    #[must_use]
    pub const fn sidebar_open(&self) -> bool {
        self.sidebar_open
    }

    /// Whether the shipping sub-menu is expanded
    #[must_use]
    pub const fn shipping_menu_open(&self) -> bool {
        self.shipping_menu_open
    }

    /// Switch page; shipping pages expand their sub-menu
    pub fn navigate(&mut self, route: Route) {
        if route.is_shipping() {
            self.shipping_menu_open = true;
        }
        tracing::debug!(from = %self.route, to = %route, "navigate");
        self.route = route;
    }

    /// Show or hide the sidebar
    pub const fn toggle_sidebar(&mut self) {
        self.sidebar_open = !self.sidebar_open;
    }

    /// Expand or collapse the shipping sub-menu
    pub const fn toggle_shipping_menu(&mut self) {
        self.shipping_menu_open = !self.shipping_menu_open;
    }
}

/// Session and navigation for one dashboard run
#[derive(Debug)]
pub struct Shell {
    ctx: Context,
    nav: Navigation,
}

impl Shell {
    /// Shell sized for a terminal `columns` wide
    #[must_use]
    pub const fn new(ctx: Context, columns: u16) -> Self {
        Self {
            ctx,
            nav: Navigation::new(columns),
        }
    }

    /// Navigation state
    #[must_use]
    pub const fn nav(&self) -> &Navigation {
        &self.nav
    }

    /// Mutable navigation state
    pub const fn nav_mut(&mut self) -> &mut Navigation {
        &mut self.nav
    }

    /// Run the session check; without a session the shell routes to login
    pub async fn start(&mut self) -> &Route {
        match self.ctx.client.me().await {
            Ok(profile) => {
                tracing::info!(email = %profile.email, "admin session active");
                self.nav.navigate(Route::Dashboard);
            }
            Err(e) => {
                tracing::info!(error = %e, "no admin session");
                self.ctx.client.session().invalidate();
                self.nav.navigate(Route::Login);
            }
        }
        self.nav.route()
    }

    /// Log in and go to the dashboard
    pub async fn login(&mut self, credentials: &LoginRequest) -> Outcome {
        match self.ctx.client.login(credentials).await {
            Ok(profile) => {
                let who = profile.name.clone().unwrap_or_else(|| profile.email.clone());
                self.nav.navigate(Route::Dashboard);
                self.ctx.applied(format!("Welcome, {who}"))
            }
            Err(e @ ClientError::Transport(_)) => {
                self.ctx.failed(&e, "Something went wrong. Please try again.")
            }
            Err(e) => self.ctx.failed(&e, "Login failed"),
        }
    }

    /// Best-effort logout; the shell always ends on the login page
    pub async fn logout(&mut self) {
        if let Err(e) = self.ctx.client.logout().await {
            tracing::warn!(error = %e, "logout call failed");
        }
        self.nav.navigate(Route::Login);
        self.ctx.notifications.info("Logged out");
    }

    /// Route to login once the session has been invalidated
    ///
    /// Returns whether the route changed.
    pub fn sync_session(&mut self) -> bool {
        if self.ctx.client.session().state() == SessionState::LoggedOut
            && *self.nav.route() != Route::Login
        {
            tracing::info!("session ended, returning to login");
            self.nav.navigate(Route::Login);
            return true;
        }
        false
    }

    /// Signed-in admin, if any
    #[must_use]
    pub fn profile(&self) -> Option<AdminProfile> {
        self.ctx.client.session().profile()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("dashboard", Route::Dashboard)]
    #[case("products", Route::ViewProducts)]
    #[case("edit-product  p1", Route::EditProduct("p1".to_string()))]
    #[case("Orders", Route::Orders)]
    #[case("states", Route::ShippingStates)]
    #[case("add-shipping", Route::AddShippingLocation)]
    fn test_route_parse(#[case] input: &str, #[case] expected: Route) {
        assert_eq!(input.parse::<Route>().unwrap(), expected);
    }

    #[rstest]
    #[case("edit-product")]
    #[case("orders 5")]
    #[case("settings")]
    fn test_route_parse_rejects(#[case] input: &str) {
        assert!(input.parse::<Route>().is_err());
    }

    #[test]
    fn test_route_display_parses_back() {
        let route = Route::EditProduct("abc".to_string());
        assert_eq!(route.to_string().parse::<Route>().unwrap(), route);
        assert_eq!(route.path(), "/dashboard/edit-product/abc");
    }

    #[rstest]
    #[case(80, false)]
    #[case(99, false)]
    #[case(100, true)]
    #[case(160, true)]
    fn test_sidebar_starts_open_on_wide_terminals(#[case] columns: u16, #[case] open: bool) {
        assert_eq!(Navigation::new(columns).sidebar_open(), open);
    }

    #[test]
    fn test_shipping_routes_expand_submenu() {
        let mut nav = Navigation::new(120);
        nav.navigate(Route::Orders);
        assert!(!nav.shipping_menu_open());

        nav.navigate(Route::ShippingStates);
        assert!(nav.shipping_menu_open());
        assert_eq!(nav.route(), &Route::ShippingStates);

        nav.toggle_shipping_menu();
        nav.toggle_sidebar();
        assert!(!nav.shipping_menu_open());
        assert!(!nav.sidebar_open());
    }
}
