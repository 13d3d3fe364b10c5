//! Command dispatch for one-shot invocations and the interactive shell

use crate::commands::{
    Availability, Commands, CouponCommands, CustomerCommands, OrderCommands, ProductCommands,
    ShellCommand, ShellLine, ShippingCommands, StaffCommands, split_line,
};
use crate::context::{Context, Outcome};
use crate::notify::NoticeKind;
use crate::render;
use crate::shell::{Route, Shell};
use crate::views::{
    CouponsView, CsvWorkflow, CustomersView, ImageWorkflow, OrdersView, ProductEditor,
    ProductsView, ShippingView, StaffView, analytics,
};
use anyhow::{Context as _, Result, bail};
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use storedesk_core::forms::{CouponForm, LoginRequest, StaffForm};
use storedesk_core::ingest::{StagedFile, UploadPhase};
use storedesk_core::listing::StatusFilter;
use storedesk_core::{Config, SortDirection};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// Every view of the dashboard behind one dispatcher
#[derive(Debug)]
pub struct App {
    config: Config,
    ctx: Context,
    shell: Shell,
    products: ProductsView,
    customers: CustomersView,
    orders: OrdersView,
    coupons: CouponsView,
    staff: StaffView,
    shipping: ShippingView,
    csv: CsvWorkflow,
    images: ImageWorkflow,
}

impl App {
    /// Build every view around `ctx`; `columns` sizes the navigation
    #[must_use]
    pub fn new(config: Config, ctx: Context, columns: u16) -> Self {
        Self {
            shell: Shell::new(ctx.clone(), columns),
            products: ProductsView::new(ctx.clone()),
            customers: CustomersView::new(ctx.clone()),
            orders: OrdersView::new(ctx.clone()),
            coupons: CouponsView::new(ctx.clone()),
            staff: StaffView::new(ctx.clone()),
            shipping: ShippingView::new(ctx.clone()),
            csv: CsvWorkflow::new(ctx.clone()),
            images: ImageWorkflow::new(ctx.clone()),
            config,
            ctx,
        }
    }

    /// Shared context
    #[must_use]
    pub const fn context(&self) -> &Context {
        &self.ctx
    }

    /// Session and navigation
    #[must_use]
    pub const fn shell(&self) -> &Shell {
        &self.shell
    }

    fn credentials(&self) -> Option<LoginRequest> {
        let auth = &self.config.auth;
        match (&auth.email, &auth.password) {
            (Some(email), Some(password)) => Some(LoginRequest {
                email: email.clone(),
                password: password.clone(),
            }),
            _ => None,
        }
    }

    /// Log in with configured credentials, or reuse an existing session
    async fn open_session(&mut self) -> bool {
        match self.credentials() {
            Some(credentials) => self.shell.login(&credentials).await.is_applied(),
            None => *self.shell.start().await != Route::Login,
        }
    }

    /// Make sure an admin session exists before a one-shot command
    ///
    /// # Errors
    ///
    /// Returns an error when no session could be established.
    pub async fn ensure_session(&mut self, out: &mut dyn Write) -> Result<()> {
        let ok = self.open_session().await;
        self.flush_notices(out)?;
        if !ok {
            bail!("Not logged in; set auth.email/auth.password or pass --email/--password");
        }
        Ok(())
    }

    /// Run one resource command and print its notices
    ///
    /// Returns `false` when the command ended in an error notice.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `out` fails.
    pub async fn execute(&mut self, command: Commands, out: &mut dyn Write) -> Result<bool> {
        if let Some(route) = route_for(&command) {
            self.shell.nav_mut().navigate(route);
        }
        self.dispatch(command, out).await?;
        let ok = self.flush_notices(out)?;
        if self.shell.sync_session() {
            writeln!(out, "Session expired; log in again")?;
        }
        Ok(ok)
    }

    /// Print queued notices; returns `false` if any was an error
    fn flush_notices(&self, out: &mut dyn Write) -> Result<bool> {
        let notices = self.ctx.notifications.drain();
        write!(out, "{}", render::notices(&notices))?;
        Ok(!notices.iter().any(|n| n.kind == NoticeKind::Error))
    }

    async fn dispatch(&mut self, command: Commands, out: &mut dyn Write) -> Result<()> {
        match command {
            Commands::Dashboard => self.dashboard(out).await,
            Commands::Products { action } => self.products(action, out).await,
            Commands::Orders { action } => self.orders(action, out).await,
            Commands::Customers { action } => self.customers(action, out).await,
            Commands::Coupons { action } => self.coupons(action, out).await,
            Commands::Staff { action } => self.staff(action, out).await,
            Commands::Shipping { action } => self.shipping(action, out).await,
            Commands::Config { show } => self.show_config(show, out),
            Commands::Shell => {
                self.ctx.notifications.info("Already in the shell");
                Ok(())
            }
        }
    }

    /// Print the resolved configuration; the password is never shown
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn show_config(&self, show: bool, out: &mut dyn Write) -> Result<()> {
        if show {
            let rendered =
                toml::to_string_pretty(&self.config).context("Failed to serialize configuration")?;
            write!(out, "{rendered}")?;
        } else {
            writeln!(out, "Configuration is valid")?;
            writeln!(out, "Backend: {}", self.config.base_url())?;
            writeln!(
                out,
                "Credentials: {}",
                if self.credentials().is_some() { "configured" } else { "not configured" }
            )?;
        }
        Ok(())
    }

    async fn dashboard(&self, out: &mut dyn Write) -> Result<()> {
        let now = chrono::Local::now();
        let stats = analytics::load_stats(&self.ctx, &now).await;
        let name = self.shell.profile().and_then(|p| p.name);
        write!(
            out,
            "{}",
            render::dashboard(&stats, storedesk_core::analytics::greeting_at(&now), name.as_deref())
        )?;
        Ok(())
    }

    async fn products(&mut self, action: ProductCommands, out: &mut dyn Write) -> Result<()> {
        match action {
            ProductCommands::List {
                search,
                category,
                sort,
                desc,
                page,
            } => {
                let query = &mut self.products.query;
                query.set_search(search.unwrap_or_default());
                query.set_category(category);
                query.sort = sort.map(|key| {
                    (key, if desc { SortDirection::Desc } else { SortDirection::Asc })
                });
                query.page = page.max(1);
                if self.products.load().await {
                    write!(out, "{}", render::products(&self.products.page()))?;
                }
            }
            ProductCommands::Show { id } => match self.ctx.client.get_product(&id).await {
                Ok(product) => write!(out, "{}", render::product_detail(&product))?,
                Err(e) => self.ctx.fetch_failed(&e, "Failed to load product data"),
            },
            ProductCommands::Add(fields) => {
                let mut editor = ProductEditor::create(self.ctx.clone());
                fields.apply(&mut editor.form);
                if editor.add_images(staged(&fields.images)).is_applied() {
                    editor.save().await;
                }
            }
            ProductCommands::Edit {
                id,
                fields,
                mut remove_images,
            } => {
                let Some(mut editor) = ProductEditor::edit(self.ctx.clone(), &id).await else {
                    return Ok(());
                };
                // highest position first so earlier removals don't shift later ones
                remove_images.sort_unstable_by(|a, b| b.cmp(a));
                remove_images.dedup();
                for position in remove_images {
                    let removed = position
                        .checked_sub(1)
                        .is_some_and(|index| editor.remove_existing_image(index));
                    if !removed {
                        self.ctx.invalid(format!("No stored image at position {position}"));
                        return Ok(());
                    }
                }
                fields.apply(&mut editor.form);
                if editor.add_images(staged(&fields.images)).is_applied() {
                    editor.save().await;
                }
            }
            ProductCommands::Delete { id } => {
                if self.products.products().is_empty() {
                    self.products.load().await;
                }
                self.products.delete(&id).await;
            }
            ProductCommands::Stock { id, availability } => {
                self.products
                    .set_availability(&id, availability == Availability::Available)
                    .await;
            }
            ProductCommands::Template { out: dir } => {
                if let Some(path) = self.csv.download_template(&dir).await {
                    writeln!(out, "Saved {}", path.display())?;
                }
            }
            ProductCommands::UploadCsv { file } => {
                if self.csv.select(file).is_applied() {
                    self.csv.upload().await;
                    if let Some(outcome) = self.csv.state().outcome() {
                        write!(out, "{}", render::csv_outcome(outcome))?;
                    }
                }
            }
            ProductCommands::StageImages { files } => {
                if self.images.stage(files).is_applied() {
                    self.write_staged(out)?;
                }
            }
            ProductCommands::Unstage { index } => {
                match index.checked_sub(1).and_then(|i| self.images.remove(i)) {
                    Some(file) => writeln!(out, "Removed {}", file.name)?,
                    None => {
                        self.ctx.invalid(format!("No staged image at position {index}"));
                    }
                }
            }
            ProductCommands::Staged => self.write_staged(out)?,
            ProductCommands::UploadImages { files } => {
                if !files.is_empty() && !self.images.stage(files).is_applied() {
                    return Ok(());
                }
                self.upload_images().await;
                if let Some(outcome) = self.images.outcome() {
                    write!(out, "{}", render::image_outcome(&outcome))?;
                }
            }
            ProductCommands::CopyUrls { index } => {
                let copied = match index {
                    Some(position) => position
                        .checked_sub(1)
                        .and_then(|i| self.images.copy_url(i)),
                    None => self.images.copy_all(),
                };
                match copied {
                    Some(urls) => writeln!(out, "{urls}")?,
                    None => {
                        self.ctx.invalid("No uploaded image URLs to copy");
                    }
                }
            }
        }
        Ok(())
    }

    /// Run the image upload, reporting progress on stderr while it is in flight
    async fn upload_images(&self) -> Outcome {
        let upload = self.images.upload();
        tokio::pin!(upload);
        let mut interval =
            tokio::time::interval(Duration::from_millis(self.ctx.settings.progress_tick_ms));
        let mut reported = false;

        let outcome = loop {
            tokio::select! {
                outcome = &mut upload => break outcome,
                _ = interval.tick() => {
                    if self.images.phase() == UploadPhase::Uploading {
                        let (done, total) = self.images.progress();
                        eprint!("\rUploading images {done}/{total}");
                        reported = true;
                    }
                }
            }
        };
        if reported {
            eprintln!();
        }
        outcome
    }

    fn write_staged(&self, out: &mut dyn Write) -> Result<()> {
        let staged = self.images.staged();
        if staged.is_empty() {
            writeln!(out, "No images staged")?;
            return Ok(());
        }
        let mut table = render::Table::new(["#", "File", "Type"]);
        for (i, file) in staged.iter().enumerate() {
            table.row([(i + 1).to_string(), file.name.clone(), file.content_type.clone()]);
        }
        write!(out, "{table}")?;
        writeln!(out, "{} image(s) staged", staged.len())?;
        Ok(())
    }

    async fn orders(&mut self, action: OrderCommands, out: &mut dyn Write) -> Result<()> {
        match action {
            OrderCommands::List {
                page,
                search,
                status,
            } => {
                let query = self.orders.query_mut();
                query.page = page.max(1);
                query.search = search;
                query.status = status;
                if self.orders.load().await {
                    write!(out, "{}", render::orders(self.orders.page(), self.orders.stats()))?;
                }
            }
            OrderCommands::Show { id } => {
                if self.orders.select(&id).is_none() {
                    let query = self.orders.query_mut();
                    query.page = 1;
                    query.status = StatusFilter::All;
                    self.orders.search(id.clone()).await;
                }
                match self.orders.select(&id) {
                    Some(order) => write!(out, "{}", render::order_detail(order))?,
                    None => {
                        self.ctx.invalid(format!("Order {id} not found"));
                    }
                }
            }
            OrderCommands::Status { id, status } => {
                self.orders.select(&id);
                if self.orders.update_status(&id, &status).await.is_applied()
                    && let Some(order) = self.orders.selected()
                {
                    write!(out, "{}", render::order_detail(order))?;
                }
            }
            OrderCommands::Delete { id } => {
                self.orders.delete(&id).await;
            }
            OrderCommands::Invoice { id, out: dir } => {
                if let Some(path) = self.orders.download_invoice(&id, &dir).await {
                    writeln!(out, "Saved {}", path.display())?;
                }
            }
        }
        Ok(())
    }

    async fn customers(&mut self, action: CustomerCommands, out: &mut dyn Write) -> Result<()> {
        match action {
            CustomerCommands::List {
                search,
                sort,
                desc,
                page,
            } => {
                let query = &mut self.customers.query;
                query.set_search(search.unwrap_or_default());
                query.sort = sort.map(|key| {
                    (key, if desc { SortDirection::Desc } else { SortDirection::Asc })
                });
                query.page = page.max(1);
                if self.customers.load().await {
                    write!(out, "{}", render::customers(&self.customers.page()))?;
                }
            }
            CustomerCommands::Delete { id } => {
                if self.customers.customers().is_empty() {
                    self.customers.load().await;
                }
                self.customers.delete(&id).await;
            }
        }
        Ok(())
    }

    async fn coupons(&mut self, action: CouponCommands, out: &mut dyn Write) -> Result<()> {
        match action {
            CouponCommands::List => {
                if self.coupons.load().await {
                    let now = chrono::Utc::now();
                    write!(
                        out,
                        "{}",
                        render::coupons(&self.coupons.with_status(now), &self.coupons.summary(now))
                    )?;
                }
            }
            CouponCommands::Add(fields) => {
                let mut form = CouponForm::default();
                fields.apply(&mut form);
                self.coupons.create(&form).await;
            }
            CouponCommands::Edit { id, fields } => {
                if !self.coupons.load().await {
                    return Ok(());
                }
                let Some(coupon) = self.coupons.coupons().iter().find(|c| c.id == id) else {
                    self.ctx.invalid(format!("Coupon {id} not found"));
                    return Ok(());
                };
                let mut form = CouponForm::from_coupon(coupon);
                fields.apply(&mut form);
                self.coupons.update(&id, &form).await;
            }
            CouponCommands::Delete { id } => {
                self.coupons.delete(&id).await;
            }
        }
        Ok(())
    }

    async fn staff(&mut self, action: StaffCommands, out: &mut dyn Write) -> Result<()> {
        match action {
            StaffCommands::List { page, search } => {
                let query = self.staff.query_mut();
                query.page = page.max(1);
                query.search = search;
                if self.staff.load().await {
                    write!(out, "{}", render::staff(self.staff.page()))?;
                }
            }
            StaffCommands::Add(fields) => {
                let mut form = StaffForm::default();
                fields.apply(&mut form);
                self.staff.save(None, &form).await;
            }
            StaffCommands::Edit { id, fields } => {
                if self.staff.page().items.is_empty() {
                    self.staff.load().await;
                }
                // records off the current page start from a blank form
                let mut form = self
                    .staff
                    .page()
                    .items
                    .iter()
                    .find(|s| s.id == id)
                    .map(StaffForm::from_staff)
                    .unwrap_or_default();
                fields.apply(&mut form);
                self.staff.save(Some(&id), &form).await;
            }
            StaffCommands::Delete { id } => {
                self.staff.delete(&id).await;
            }
        }
        Ok(())
    }

    async fn shipping(&mut self, action: ShippingCommands, out: &mut dyn Write) -> Result<()> {
        if let Some(form) = action.zone_form() {
            self.shipping.add_zone(&form).await;
            return Ok(());
        }
        match action {
            ShippingCommands::Zones => {
                if self.shipping.load().await {
                    write!(out, "{}", render::zones(self.shipping.zones()))?;
                }
            }
            ShippingCommands::States => {
                if self.shipping.load().await {
                    write!(out, "{}", render::states(&self.shipping.states()))?;
                }
            }
            ShippingCommands::DeleteZone { id } => {
                if self.shipping.zones().is_empty() {
                    self.shipping.load().await;
                }
                self.shipping.delete_zone(&id).await;
            }
            ShippingCommands::DeleteState { name } => {
                self.shipping.delete_state(&name).await;
            }
            ShippingCommands::AddZone { .. } => {}
        }
        Ok(())
    }

    /// Interactive loop reading one command per line from `input`
    ///
    /// Ends on `exit`, `quit` or end of input.
    ///
    /// # Errors
    ///
    /// Returns an error if reading input or writing output fails.
    pub async fn run_shell<R>(&mut self, input: R, out: &mut dyn Write) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        self.open_session().await;
        self.flush_notices(out)?;
        write!(out, "{}", render::sidebar(self.shell.nav()))?;

        let mut lines = input.lines();
        loop {
            write!(out, "storedesk:{}> ", self.shell.nav().route())?;
            out.flush()?;
            let Some(line) = lines.next_line().await.context("Failed to read input")? else {
                writeln!(out)?;
                break;
            };

            let words = split_line(&line);
            if words.is_empty() {
                continue;
            }
            let parsed = match ShellLine::try_parse_from(words) {
                Ok(parsed) => parsed,
                Err(e) => {
                    write!(out, "{}", e.render())?;
                    continue;
                }
            };
            if !self.shell_command(parsed.command, out).await? {
                break;
            }
        }
        tracing::info!("shell closed");
        Ok(())
    }

    /// Returns `false` when the shell should exit
    async fn shell_command(&mut self, command: ShellCommand, out: &mut dyn Write) -> Result<bool> {
        match command {
            ShellCommand::Exit => return Ok(false),
            ShellCommand::Login { email, password } => {
                self.shell.login(&LoginRequest { email, password }).await;
            }
            ShellCommand::Logout => self.shell.logout().await,
            ShellCommand::Whoami => match self.shell.profile() {
                Some(profile) => match profile.name {
                    Some(name) => writeln!(out, "{name} <{}>", profile.email)?,
                    None => writeln!(out, "{}", profile.email)?,
                },
                None => writeln!(out, "Not logged in")?,
            },
            ShellCommand::Sidebar => {
                self.shell.nav_mut().toggle_sidebar();
                write!(out, "{}", render::sidebar(self.shell.nav()))?;
            }
            ShellCommand::ShippingMenu => {
                self.shell.nav_mut().toggle_shipping_menu();
                write!(out, "{}", render::sidebar(self.shell.nav()))?;
            }
            ShellCommand::Go { page } => match page.join(" ").parse::<Route>() {
                Ok(route) => return self.go(route, out).await,
                Err(e) => writeln!(out, "{}", crate::context::core_message(&e))?,
            },
            ShellCommand::Resource(command) => {
                if self.guarded(&command) {
                    writeln!(out, "Log in first: login EMAIL PASSWORD")?;
                } else {
                    self.execute(command, out).await?;
                }
                return Ok(true);
            }
        }
        self.flush_notices(out)?;
        self.shell.sync_session();
        Ok(true)
    }

    /// Resource pages need a session; `config` does not
    fn guarded(&self, command: &Commands) -> bool {
        !matches!(command, Commands::Config { .. })
            && !self.ctx.client.session().is_authenticated()
    }

    /// Open a page and show its default content
    async fn go(&mut self, route: Route, out: &mut dyn Write) -> Result<bool> {
        let command = match &route {
            Route::Login => None,
            Route::Dashboard => Some(Commands::Dashboard),
            Route::ViewProducts => Some(Commands::Products {
                action: ProductCommands::List {
                    search: None,
                    category: None,
                    sort: None,
                    desc: false,
                    page: 1,
                },
            }),
            Route::AddProduct => Some(Commands::Products {
                action: ProductCommands::Staged,
            }),
            Route::EditProduct(id) => Some(Commands::Products {
                action: ProductCommands::Show { id: id.clone() },
            }),
            Route::Orders => Some(Commands::Orders {
                action: OrderCommands::List {
                    page: 1,
                    search: String::new(),
                    status: StatusFilter::All,
                },
            }),
            Route::Customers => Some(Commands::Customers {
                action: CustomerCommands::List {
                    search: None,
                    sort: None,
                    desc: false,
                    page: 1,
                },
            }),
            Route::Coupons => Some(Commands::Coupons {
                action: CouponCommands::List,
            }),
            Route::Staff => Some(Commands::Staff {
                action: StaffCommands::List {
                    page: 1,
                    search: String::new(),
                },
            }),
            Route::ShippingLocations | Route::AddShippingLocation => Some(Commands::Shipping {
                action: ShippingCommands::Zones,
            }),
            Route::ShippingStates => Some(Commands::Shipping {
                action: ShippingCommands::States,
            }),
        };

        match command {
            Some(command) if self.guarded(&command) => {
                writeln!(out, "Log in first: login EMAIL PASSWORD")?;
                return Ok(true);
            }
            Some(command) => {
                self.execute(command, out).await?;
            }
            None => {}
        }
        self.shell.nav_mut().navigate(route);
        write!(out, "{}", render::sidebar(self.shell.nav()))?;
        Ok(true)
    }
}

fn staged(paths: &[PathBuf]) -> Vec<StagedFile> {
    paths.iter().map(StagedFile::from_path).collect()
}

/// Page a resource command belongs to
fn route_for(command: &Commands) -> Option<Route> {
    let route = match command {
        Commands::Dashboard => Route::Dashboard,
        Commands::Products { action } => match action {
            ProductCommands::List { .. }
            | ProductCommands::Delete { .. }
            | ProductCommands::Stock { .. } => Route::ViewProducts,
            ProductCommands::Show { id } | ProductCommands::Edit { id, .. } => {
                Route::EditProduct(id.clone())
            }
            _ => Route::AddProduct,
        },
        Commands::Orders { .. } => Route::Orders,
        Commands::Customers { .. } => Route::Customers,
        Commands::Coupons { .. } => Route::Coupons,
        Commands::Staff { .. } => Route::Staff,
        Commands::Shipping { action } => match action {
            ShippingCommands::AddZone { .. } => Route::AddShippingLocation,
            ShippingCommands::States | ShippingCommands::DeleteState { .. } => {
                Route::ShippingStates
            }
            _ => Route::ShippingLocations,
        },
        Commands::Config { .. } | Commands::Shell => return None,
    };
    Some(route)
}

/// Terminal width from `COLUMNS`, 80 when unset
#[must_use]
pub fn terminal_columns() -> u16 {
    std::env::var("COLUMNS")
        .ok()
        .and_then(|c| c.trim().parse().ok())
        .unwrap_or(80)
}
