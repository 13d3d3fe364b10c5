//! Command-line surface shared by one-shot invocations and the interactive shell

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use storedesk_core::forms::{CouponForm, ProductForm, ShippingZoneForm, StaffForm};
use storedesk_core::listing::{CustomerSortKey, ProductSortKey, StatusFilter};
use storedesk_core::types::CouponType;
use storedesk_core::OrderStatus;

/// Command line interface for the storedesk admin console
#[derive(Debug, Parser)]
#[command(
    name = "storedesk",
    version = env!("CARGO_PKG_VERSION"),
    about = "Admin console for a storefront backend",
    long_about = "Manage the catalog, bulk product uploads, orders, customers, coupons, staff and shipping zones of a storefront backend from the terminal."
)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); overrides logging.level
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// Log format (json, pretty); overrides logging.format
    #[arg(long)]
    pub log_format: Option<String>,

    /// Enable structured JSON logging
    #[arg(long)]
    pub json: bool,

    /// Answer yes to every confirmation
    #[arg(short, long)]
    pub yes: bool,

    /// Admin email (overrides auth.email)
    #[arg(long, env = "STOREDESK_EMAIL")]
    pub email: Option<String>,

    /// Admin password (overrides auth.password)
    #[arg(long, env = "STOREDESK_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Subcommand; starts the interactive shell when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Resource commands
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Show the analytics dashboard
    Dashboard,

    /// Manage products and bulk uploads
    Products {
        /// Product subcommand
        #[command(subcommand)]
        action: ProductCommands,
    },

    /// Manage orders
    Orders {
        /// Order subcommand
        #[command(subcommand)]
        action: OrderCommands,
    },

    /// Manage customers
    Customers {
        /// Customer subcommand
        #[command(subcommand)]
        action: CustomerCommands,
    },

    /// Manage coupons
    Coupons {
        /// Coupon subcommand
        #[command(subcommand)]
        action: CouponCommands,
    },

    /// Manage staff records
    Staff {
        /// Staff subcommand
        #[command(subcommand)]
        action: StaffCommands,
    },

    /// Manage shipping zones and states
    Shipping {
        /// Shipping subcommand
        #[command(subcommand)]
        action: ShippingCommands,
    },

    /// Show the resolved configuration
    Config {
        /// Print the configuration as TOML
        #[arg(short, long)]
        show: bool,
    },

    /// Start the interactive shell
    Shell,
}

/// Product availability
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Availability {
    /// Stock 10
    Available,
    /// Stock 0
    Unavailable,
}

/// Product commands
#[derive(Debug, Clone, Subcommand)]
pub enum ProductCommands {
    /// List products
    List {
        /// Match name, category or brand
        #[arg(short, long)]
        search: Option<String>,
        /// Exact category
        #[arg(long)]
        category: Option<String>,
        /// Sort field (name, category, brand, price, stock)
        #[arg(long)]
        sort: Option<ProductSortKey>,
        /// Sort descending
        #[arg(long, requires = "sort")]
        desc: bool,
        /// Page number
        #[arg(short, long, default_value = "1")]
        page: usize,
    },
    /// Show one product
    Show {
        /// Product id
        id: String,
    },
    /// Create a product
    Add(ProductArgs),
    /// Edit a product
    Edit {
        /// Product id
        id: String,
        /// Fields to change
        #[command(flatten)]
        fields: ProductArgs,
        /// Remove a stored image by its 1-based position (repeatable)
        #[arg(long = "remove-image", value_name = "N")]
        remove_images: Vec<usize>,
    },
    /// Delete a product
    Delete {
        /// Product id
        id: String,
    },
    /// Mark a product available or unavailable
    Stock {
        /// Product id
        id: String,
        /// New availability
        #[arg(value_enum)]
        availability: Availability,
    },
    /// Download the bulk-upload CSV template
    Template {
        /// Directory to save into
        #[arg(short, long, default_value = ".")]
        out: PathBuf,
    },
    /// Create products from a CSV file
    UploadCsv {
        /// CSV file
        file: PathBuf,
    },
    /// Stage images for a bulk image upload
    StageImages {
        /// Image files
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Unstage one image by its 1-based position
    Unstage {
        /// Position in the staged list
        index: usize,
    },
    /// List staged images
    Staged,
    /// Upload staged images, staging any files given first
    UploadImages {
        /// Image files
        files: Vec<PathBuf>,
    },
    /// Print uploaded image URLs for the CSV images column
    CopyUrls {
        /// Only the URL at this 1-based position
        #[arg(long)]
        index: Option<usize>,
    },
}

/// Product fields; omitted fields keep their current value
#[derive(Debug, Clone, Default, Args)]
pub struct ProductArgs {
    /// Product name
    #[arg(long)]
    pub name: Option<String>,
    /// Price
    #[arg(long)]
    pub price: Option<String>,
    /// Category
    #[arg(long)]
    pub category: Option<String>,
    /// Stock count
    #[arg(long)]
    pub stock: Option<String>,
    /// Brand
    #[arg(long)]
    pub brand: Option<String>,
    /// Description
    #[arg(long)]
    pub description: Option<String>,
    /// Frame dimensions
    #[arg(long)]
    pub frame_dimensions: Option<String>,
    /// Product information
    #[arg(long)]
    pub product_information: Option<String>,
    /// New arrival flag
    #[arg(long)]
    pub new_arrival: Option<bool>,
    /// Hot seller flag
    #[arg(long)]
    pub hot_seller: Option<bool>,
    /// Men flag
    #[arg(long)]
    pub men: Option<bool>,
    /// Women flag
    #[arg(long)]
    pub women: Option<bool>,
    /// Kids flag
    #[arg(long)]
    pub kids: Option<bool>,
    /// Image file to attach (repeatable, at most 4 images in total)
    #[arg(long = "image", value_name = "FILE")]
    pub images: Vec<PathBuf>,
}

fn set(target: &mut String, value: Option<&String>) {
    if let Some(value) = value {
        target.clone_from(value);
    }
}

fn set_flag(target: &mut bool, value: Option<bool>) {
    if let Some(value) = value {
        *target = value;
    }
}

impl ProductArgs {
    /// Copy the given fields into `form`
    pub fn apply(&self, form: &mut ProductForm) {
        set(&mut form.name, self.name.as_ref());
        set(&mut form.price, self.price.as_ref());
        set(&mut form.category, self.category.as_ref());
        set(&mut form.stock, self.stock.as_ref());
        set(&mut form.brand, self.brand.as_ref());
        set(&mut form.description, self.description.as_ref());
        set(&mut form.frame_dimensions, self.frame_dimensions.as_ref());
        set(&mut form.product_information, self.product_information.as_ref());
        set_flag(&mut form.new_arrival, self.new_arrival);
        set_flag(&mut form.hot_seller, self.hot_seller);
        set_flag(&mut form.men, self.men);
        set_flag(&mut form.women, self.women);
        set_flag(&mut form.kids, self.kids);
    }
}

/// Order commands
#[derive(Debug, Clone, Subcommand)]
pub enum OrderCommands {
    /// List one page of orders
    List {
        /// Page number
        #[arg(short, long, default_value = "1")]
        page: u32,
        /// Match order id, customer name or email
        #[arg(short, long, default_value = "")]
        search: String,
        /// Status filter (all, pending, confirmed, processing, shipped, delivered, cancelled)
        #[arg(long, default_value = "all")]
        status: StatusFilter,
    },
    /// Show one order
    Show {
        /// Order id
        id: String,
    },
    /// Change an order's status
    Status {
        /// Order id
        id: String,
        /// New status (pending, confirmed, processing, shipped, delivered, cancelled)
        #[arg(value_parser = parse_order_status)]
        status: OrderStatus,
    },
    /// Delete an order
    Delete {
        /// Order id
        id: String,
    },
    /// Download an order's invoice PDF
    Invoice {
        /// Order id
        id: String,
        /// Directory to save into
        #[arg(short, long, default_value = ".")]
        out: PathBuf,
    },
}

/// Only the six known statuses can be sent to the backend
fn parse_order_status(raw: &str) -> Result<OrderStatus, String> {
    raw.parse().map_err(|e: storedesk_core::Error| e.to_string())
}

/// Customer commands
#[derive(Debug, Clone, Subcommand)]
pub enum CustomerCommands {
    /// List customers
    List {
        /// Match name or email
        #[arg(short, long)]
        search: Option<String>,
        /// Sort field (name, email)
        #[arg(long)]
        sort: Option<CustomerSortKey>,
        /// Sort descending
        #[arg(long, requires = "sort")]
        desc: bool,
        /// Page number
        #[arg(short, long, default_value = "1")]
        page: usize,
    },
    /// Delete a customer
    Delete {
        /// Customer id
        id: String,
    },
}

/// Coupon commands
#[derive(Debug, Clone, Subcommand)]
pub enum CouponCommands {
    /// List coupons with their status
    List,
    /// Create a coupon
    Add(CouponArgs),
    /// Edit a coupon
    Edit {
        /// Coupon id
        id: String,
        /// Fields to change
        #[command(flatten)]
        fields: CouponArgs,
    },
    /// Delete a coupon
    Delete {
        /// Coupon id
        id: String,
    },
}

/// Coupon fields; omitted fields keep their current value
#[derive(Debug, Clone, Default, Args)]
pub struct CouponArgs {
    /// Display name
    #[arg(long)]
    pub name: Option<String>,
    /// Checkout code
    #[arg(long)]
    pub code: Option<String>,
    /// Discount kind (percentage, flat)
    #[arg(long = "type")]
    pub kind: Option<CouponType>,
    /// Discount amount
    #[arg(long)]
    pub amount: Option<String>,
    /// Minimum order value
    #[arg(long)]
    pub min_value: Option<String>,
    /// Maximum discount
    #[arg(long)]
    pub max_value: Option<String>,
    /// Usage limit
    #[arg(long)]
    pub usage_limit: Option<String>,
    /// Start date, YYYY-MM-DD (empty to clear)
    #[arg(long)]
    pub start_date: Option<String>,
    /// Expiry date, YYYY-MM-DD (empty to clear)
    #[arg(long)]
    pub expiry_date: Option<String>,
}

impl CouponArgs {
    /// Copy the given fields into `form`
    pub fn apply(&self, form: &mut CouponForm) {
        set(&mut form.name, self.name.as_ref());
        set(&mut form.code, self.code.as_ref());
        if let Some(kind) = self.kind {
            form.kind = kind;
        }
        set(&mut form.amount, self.amount.as_ref());
        set(&mut form.min_value, self.min_value.as_ref());
        set(&mut form.max_value, self.max_value.as_ref());
        set(&mut form.usage_limit, self.usage_limit.as_ref());
        set(&mut form.start_date, self.start_date.as_ref());
        set(&mut form.expiry_date, self.expiry_date.as_ref());
    }
}

/// Staff commands
#[derive(Debug, Clone, Subcommand)]
pub enum StaffCommands {
    /// List one page of staff
    List {
        /// Page number
        #[arg(short, long, default_value = "1")]
        page: u32,
        /// Match name, phone or designation
        #[arg(short, long, default_value = "")]
        search: String,
    },
    /// Add a staff member
    Add(StaffArgs),
    /// Edit a staff member on the current page
    Edit {
        /// Staff id
        id: String,
        /// Fields to change
        #[command(flatten)]
        fields: StaffArgs,
    },
    /// Delete a staff member
    Delete {
        /// Staff id
        id: String,
    },
}

/// Staff fields; omitted fields keep their current value
#[derive(Debug, Clone, Default, Args)]
pub struct StaffArgs {
    /// Full name
    #[arg(long)]
    pub name: Option<String>,
    /// Phone
    #[arg(long)]
    pub phone: Option<String>,
    /// Gender
    #[arg(long)]
    pub gender: Option<String>,
    /// Job title
    #[arg(long)]
    pub designation: Option<String>,
    /// Advance paid
    #[arg(long)]
    pub advance: Option<String>,
    /// Monthly salary
    #[arg(long)]
    pub monthly_salary: Option<String>,
    /// Whether commission applies
    #[arg(long)]
    pub set_commission: Option<bool>,
    /// Commission percent
    #[arg(long)]
    pub commission_percent: Option<String>,
    /// Bill amount above which commission applies
    #[arg(long)]
    pub commission_bill_threshold: Option<String>,
    /// Joining date, YYYY-MM-DD
    #[arg(long)]
    pub date_of_joining: Option<String>,
    /// Postal address
    #[arg(long)]
    pub address: Option<String>,
}

impl StaffArgs {
    /// Copy the given fields into `form`
    pub fn apply(&self, form: &mut StaffForm) {
        set(&mut form.name, self.name.as_ref());
        set(&mut form.phone, self.phone.as_ref());
        set(&mut form.gender, self.gender.as_ref());
        set(&mut form.designation, self.designation.as_ref());
        set(&mut form.advance, self.advance.as_ref());
        set(&mut form.monthly_salary, self.monthly_salary.as_ref());
        set_flag(&mut form.set_commission, self.set_commission);
        set(&mut form.commission_percent, self.commission_percent.as_ref());
        set(
            &mut form.commission_bill_threshold,
            self.commission_bill_threshold.as_ref(),
        );
        set(&mut form.date_of_joining, self.date_of_joining.as_ref());
        set(&mut form.address, self.address.as_ref());
    }
}

/// Shipping commands
#[derive(Debug, Clone, Subcommand)]
pub enum ShippingCommands {
    /// List shipping zones
    Zones,
    /// Add a shipping zone
    AddZone {
        /// Postal code
        #[arg(long, default_value = "")]
        zip_code: String,
        /// Shipping charge
        #[arg(long, default_value = "")]
        charges: String,
        /// Order value below which the charge applies
        #[arg(long, default_value = "")]
        price_less_than: String,
        /// State name
        #[arg(long, default_value = "")]
        state: String,
        /// State code
        #[arg(long, default_value = "")]
        state_code: String,
        /// GST code
        #[arg(long, default_value = "")]
        gst_code: String,
    },
    /// Delete a shipping zone
    DeleteZone {
        /// Zone id
        id: String,
    },
    /// List states derived from the zones
    States,
    /// Delete every zone of a state
    DeleteState {
        /// State name
        name: String,
    },
}

impl ShippingCommands {
    /// Zone form from `add-zone` arguments
    #[must_use]
    pub fn zone_form(&self) -> Option<ShippingZoneForm> {
        match self {
            Self::AddZone {
                zip_code,
                charges,
                price_less_than,
                state,
                state_code,
                gst_code,
            } => Some(ShippingZoneForm {
                zip_code: zip_code.clone(),
                charges: charges.clone(),
                price_less_than: price_less_than.clone(),
                state: state.clone(),
                state_code: state_code.clone(),
                gst_code: gst_code.clone(),
            }),
            _ => None,
        }
    }
}

/// One line typed into the interactive shell
#[derive(Debug, Parser)]
#[command(name = "", no_binary_name = true, disable_version_flag = true)]
pub struct ShellLine {
    /// What to run
    #[command(subcommand)]
    pub command: ShellCommand,
}

/// Commands available inside the shell
#[derive(Debug, Clone, Subcommand)]
pub enum ShellCommand {
    /// Resource commands
    #[command(flatten)]
    Resource(Commands),

    /// Log in as an admin
    Login {
        /// Admin email
        email: String,
        /// Admin password
        password: String,
    },

    /// Log out and return to the login page
    Logout,

    /// Show the signed-in admin
    Whoami,

    /// Open a page (dashboard, products, orders, customers, coupons, staff, shipping, states, ...)
    Go {
        /// Page name, plus the product id for edit-product
        #[arg(required = true, num_args = 1..)]
        page: Vec<String>,
    },

    /// Show or hide the sidebar
    Sidebar,

    /// Expand or collapse the shipping menu
    ShippingMenu,

    /// Leave the shell
    #[command(alias = "quit")]
    Exit,
}

/// Split a shell line into words; single or double quotes group words
#[must_use]
pub fn split_line(line: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut in_word = false;

    for c in line.chars() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), c) => current.push(c),
            (None, '"' | '\'') => {
                quote = Some(c);
                in_word = true;
            }
            (None, c) if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            (None, c) => {
                current.push(c);
                in_word = true;
            }
        }
    }
    if in_word {
        words.push(current);
    }
    words
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
        ShellLine::command().debug_assert();
    }

    #[test]
    fn test_split_line_handles_quotes() {
        assert_eq!(
            split_line(r#"products add --name "Aviator Classic" --brand 'Ray Ban' --price 10"#),
            vec![
                "products", "add", "--name", "Aviator Classic", "--brand", "Ray Ban", "--price",
                "10"
            ]
        );
        assert_eq!(split_line("  orders   list "), vec!["orders", "list"]);
        assert_eq!(split_line(r#"coupons edit c1 --start-date """#), vec!["coupons", "edit", "c1", "--start-date", ""]);
    }

    #[test]
    fn test_parse_order_list_filters() {
        let cli = Cli::try_parse_from([
            "storedesk", "orders", "list", "--status", "shipped", "--search", "alice",
        ])
        .unwrap();

        let Some(Commands::Orders {
            action: OrderCommands::List { page, search, status },
        }) = cli.command
        else {
            panic!("expected orders list");
        };
        assert_eq!(page, 1);
        assert_eq!(search, "alice");
        assert_eq!(status, StatusFilter::Only(OrderStatus::Shipped));
    }

    #[test]
    fn test_parse_rejects_unknown_status() {
        assert!(Cli::try_parse_from(["storedesk", "orders", "status", "o1", "lost"]).is_err());
        assert!(Cli::try_parse_from(["storedesk", "orders", "status", "o1", "On_Hold"]).is_err());

        let cli = Cli::try_parse_from(["storedesk", "orders", "status", "o1", "Delivered"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Orders {
                action: OrderCommands::Status { ref status, .. }
            }) if *status == OrderStatus::Delivered
        ));
    }

    #[test]
    fn test_shell_line_accepts_resource_and_shell_commands() {
        let line = ShellLine::try_parse_from(split_line("go edit-product p1")).unwrap();
        assert!(matches!(line.command, ShellCommand::Go { ref page } if page == &["edit-product", "p1"]));

        let line = ShellLine::try_parse_from(split_line("products stock p1 unavailable")).unwrap();
        assert!(matches!(
            line.command,
            ShellCommand::Resource(Commands::Products {
                action: ProductCommands::Stock {
                    availability: Availability::Unavailable,
                    ..
                }
            })
        ));

        let line = ShellLine::try_parse_from(["quit"]).unwrap();
        assert!(matches!(line.command, ShellCommand::Exit));
    }

    #[test]
    fn test_product_args_only_override_given_fields() {
        let mut form = ProductForm {
            name: "Aviator".to_string(),
            price: "1499".to_string(),
            men: true,
            ..ProductForm::default()
        };
        let args = ProductArgs {
            price: Some("1299".to_string()),
            men: Some(false),
            ..ProductArgs::default()
        };

        args.apply(&mut form);

        assert_eq!(form.name, "Aviator");
        assert_eq!(form.price, "1299");
        assert!(!form.men);
    }
}
