//! Command execution against the client

use crate::commands::{AdminCommand, Command, SubsCommand, TrackedArgs, HELP};
use crate::views;
use anyhow::{anyhow, Result};
use subsphere_common::api::{admin, overview, plans, subscriptions, tracker};
use subsphere_common::errors::ApiError;
use subsphere_common::models::{CreatePlanRequest, TrackedSubscriptionRequest};
use subsphere_common::validation::{self, LoginForm, RegisterForm};
use subsphere_common::{AuthOutcome, SubsphereClient, View};

/// What the loop should do after a command
#[derive(Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

pub struct Shell {
    client: SubsphereClient,
}

fn describe(errors: &validation::FieldErrors) -> String {
    errors
        .iter()
        .map(|(field, message)| format!("{}: {}", field, message))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Server message for a failed call, or the generic fallback
fn failed(err: &ApiError) -> String {
    err.user_message()
}

fn outcome(outcome: &AuthOutcome) -> String {
    outcome.message().unwrap_or_default().to_string()
}

impl Shell {
    pub fn new(client: SubsphereClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &SubsphereClient {
        &self.client
    }

    /// Short prompt showing the current view and account
    pub fn prompt(&self) -> String {
        let who = self
            .client
            .auth
            .current_user()
            .map(|u| u.email)
            .unwrap_or_else(|| "guest".to_string());
        format!("{} {}> ", who, self.client.navigator.current())
    }

    /// Open a view through the protected-route rules and render it
    async fn open(&self, view: View) -> String {
        let reached = self.client.visit(view);
        let mut out = String::new();
        if reached != view {
            let needs = if self.client.auth.is_authenticated() {
                "an admin account"
            } else {
                "login"
            };
            out.push_str(&format!("{} requires {}; showing {}\n", view, needs, reached));
        }
        out.push_str(&self.render(reached).await);
        out
    }

    async fn render(&self, view: View) -> String {
        match view {
            View::Landing => format!(
                "SubSphere v{}: subscription billing for SaaS teams. Try 'pricing' or 'help'.\n",
                subsphere_common::VERSION
            ),
            View::Login | View::Auth => "Sign in with: login <email> <password>\n".to_string(),
            View::Register => {
                "Create an account with: register <company> <name> <email> <password>\n".to_string()
            }
            View::Pricing => match plans::list_public_plans(&self.client.public).await {
                Ok(list) => views::plans(&list),
                Err(e) => format!(
                    "{}\n",
                    e.server_message()
                        .unwrap_or("Failed to load plans. Please try again.")
                ),
            },
            View::Dashboard => {
                let email = self
                    .client
                    .auth
                    .current_user()
                    .map(|u| u.email)
                    .unwrap_or_default();
                let data = overview::load_dashboard(&self.client.api, &self.client.controller).await;
                views::dashboard(&email, &data)
            }
            View::MySubscriptions => {
                let data = overview::load_personal(&self.client.api, &self.client.controller).await;
                views::personal(&data)
            }
            View::Admin => {
                let plans = self.guarded(admin::list_plans(&self.client.api).await);
                let users = self.guarded(admin::list_users(&self.client.api).await);
                let mut out = String::from("Admin dashboard\n");
                match (&users, &plans) {
                    (Ok(u), Ok(p)) => out.push_str(&format!(
                        "Total users: {}   Total plans: {}   Active plans: {}\n\nPlans\n{}\nUsers\n{}",
                        u.len(),
                        p.len(),
                        p.iter().filter(|plan| plan.active).count(),
                        views::plans(p),
                        views::users(u)
                    )),
                    (Err(e), _) | (_, Err(e)) => out.push_str(&format!("{}\n", failed(e))),
                }
                out
            }
        }
    }

    fn guarded<T>(&self, result: subsphere_common::Result<T>) -> subsphere_common::Result<T> {
        self.client.guarded(result)
    }

    /// Reject authenticated commands for anonymous users before calling out
    fn require_session(&self) -> Result<()> {
        if self.client.auth.is_authenticated() {
            Ok(())
        } else {
            self.client.navigator.navigate(View::Login);
            Err(anyhow!("Please login first."))
        }
    }

    async fn tracked_request(&self, args: TrackedArgs) -> Result<TrackedSubscriptionRequest> {
        let category = match args.category_id {
            None => None,
            Some(id) => {
                let categories = self
                    .guarded(tracker::categories(&self.client.api).await)
                    .map_err(|e| anyhow!(failed(&e)))?;
                Some(
                    categories
                        .into_iter()
                        .find(|c| c.id == id)
                        .ok_or_else(|| anyhow!("no category with id {}", id))?,
                )
            }
        };

        let request = TrackedSubscriptionRequest {
            subscription_name: args.name.trim().to_string(),
            amount: args.amount,
            billing_cycle: args.cycle,
            start_date: args.start_date,
            category,
            notes: args.notes,
        };
        validation::check(&request).map_err(|e| anyhow!(describe(&e)))?;
        Ok(request)
    }

    /// Run one command; the returned text is what the user sees
    pub async fn execute(&self, command: Command) -> Result<(Flow, String)> {
        let text = match command {
            Command::Help => HELP.to_string(),
            Command::Quit => return Ok((Flow::Exit, String::new())),
            Command::Goto(path) => {
                let view = View::from_path(&path);
                let text = self.open(view).await;
                if let Some(target) = View::redirect_target(&path).filter(|_| view.is_auth_entry()) {
                    self.client.navigator.set_pending(target);
                }
                text
            }
            Command::Login { email, password } => self.login(email, password).await?,
            Command::Register {
                tenant_name,
                user_name,
                email,
                password,
                confirm,
            } => {
                self.client.navigator.navigate(View::Register);
                let form = RegisterForm {
                    tenant_name,
                    user_name,
                    email,
                    password,
                    confirm_password: confirm,
                };
                let request = form.check().map_err(|e| anyhow!(describe(&e)))?;
                let result = self.client.auth.register(request).await;
                if !result.is_success() {
                    return Err(anyhow!(outcome(&result)));
                }
                self.client.navigator.navigate(View::Login);
                outcome(&result)
            }
            Command::Logout => {
                self.client.auth.logout();
                self.client.navigator.navigate(View::Landing);
                "Logged out.".to_string()
            }
            Command::WhoAmI => match self.client.auth.current_user() {
                Some(user) => format!("{} ({})", user.email, user.role),
                None => "Not signed in.".to_string(),
            },
            Command::Pricing => self.open(View::Pricing).await,
            Command::Subscribe(plan_id) => {
                if !self.client.auth.is_authenticated() {
                    return Err(anyhow!(
                        "Please login first to subscribe to a plan. Run 'goto /login?redirect=/'."
                    ));
                }
                let envelope = self
                    .guarded(subscriptions::subscribe(&self.client.api, plan_id).await)
                    .map_err(|e| {
                        anyhow!(e
                            .server_message()
                            .unwrap_or("Failed to subscribe. Please try again.")
                            .to_string())
                    })?;
                self.client.navigator.navigate(View::Dashboard);
                envelope
                    .message()
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("Successfully subscribed to plan {}!", plan_id))
            }
            Command::Subscription => {
                self.require_session()?;
                let sub = self
                    .guarded(subscriptions::current(&self.client.api).await)
                    .map_err(|e| anyhow!(failed(&e)))?;
                views::tenant_subscription(sub.as_ref())
            }
            Command::Unsubscribe => {
                self.require_session()?;
                let envelope = self
                    .guarded(subscriptions::cancel(&self.client.api).await)
                    .map_err(|e| anyhow!(failed(&e)))?;
                envelope.message().unwrap_or("Subscription cancelled.").to_string()
            }
            Command::Dashboard => self.open(View::Dashboard).await,
            Command::Console => {
                self.require_session()?;
                let console = self
                    .guarded(subscriptions::developer_console(&self.client.api).await)
                    .map_err(|e| anyhow!(failed(&e)))?;
                views::developer_console(console.as_ref())
            }
            Command::Subs(sub) => self.subs(sub).await?,
            Command::Admin(sub) => self.admin(sub).await?,
        };
        Ok((Flow::Continue, text))
    }

    async fn login(&self, email: String, password: String) -> Result<String> {
        self.client.navigator.navigate(View::Login);
        let request = LoginForm { email, password }
            .check()
            .map_err(|e| anyhow!(describe(&e)))?;

        let result = self.client.auth.login(&request.email, &request.password).await;
        if !result.is_success() {
            return Err(anyhow!(outcome(&result)));
        }

        let landing = match self.client.navigator.take_pending() {
            Some(destination) => destination,
            None if self.client.auth.is_admin() => View::Admin,
            None => View::Dashboard,
        };
        let mut text = match result.message() {
            Some(message) => format!("{}\n", message),
            None => String::new(),
        };
        text.push_str(&self.open(landing).await);
        Ok(text)
    }

    async fn subs(&self, command: SubsCommand) -> Result<String> {
        // the page itself goes through the protected-route rules instead
        if command != SubsCommand::Page {
            self.require_session()?;
        }
        let api = &self.client.api;

        let text = match command {
            SubsCommand::Page => self.open(View::MySubscriptions).await,
            SubsCommand::List => views::tracked(
                &self
                    .guarded(tracker::list(api).await)
                    .map_err(|e| anyhow!(failed(&e)))?,
            ),
            SubsCommand::Active => views::tracked(
                &self
                    .guarded(tracker::list_active(api).await)
                    .map_err(|e| anyhow!(failed(&e)))?,
            ),
            SubsCommand::ByCategory(id) => views::tracked(
                &self
                    .guarded(tracker::list_by_category(api, id).await)
                    .map_err(|e| anyhow!(failed(&e)))?,
            ),
            SubsCommand::Add(args) => {
                let request = self.tracked_request(args).await?;
                let envelope = self
                    .guarded(tracker::create(api, &request).await)
                    .map_err(|e| anyhow!("Failed to save subscription: {}", failed(&e)))?;
                envelope.message().unwrap_or("Subscription added.").to_string()
            }
            SubsCommand::Update(id, args) => {
                let request = self.tracked_request(args).await?;
                let envelope = self
                    .guarded(tracker::update(api, id, &request).await)
                    .map_err(|e| anyhow!("Failed to save subscription: {}", failed(&e)))?;
                envelope.message().unwrap_or("Subscription updated.").to_string()
            }
            SubsCommand::Cancel(id) => {
                let envelope = self
                    .guarded(tracker::cancel(api, id).await)
                    .map_err(|e| anyhow!(failed(&e)))?;
                envelope.message().unwrap_or("Subscription cancelled.").to_string()
            }
            SubsCommand::Upcoming(days) => views::renewals(
                &self
                    .guarded(tracker::upcoming(api, days).await)
                    .map_err(|e| anyhow!(failed(&e)))?,
            ),
            SubsCommand::Stats => views::stats(
                self.guarded(tracker::stats(api).await)
                    .map_err(|e| anyhow!(failed(&e)))?
                    .as_ref(),
            ),
            SubsCommand::Insights => views::insights(
                &self
                    .guarded(tracker::insights(api).await)
                    .map_err(|e| anyhow!(failed(&e)))?,
            ),
            SubsCommand::Categories => views::categories(
                &self
                    .guarded(tracker::categories(api).await)
                    .map_err(|e| anyhow!(failed(&e)))?,
            ),
        };
        Ok(text)
    }

    async fn admin(&self, command: AdminCommand) -> Result<String> {
        // admin actions are only offered from the admin view
        if self.client.visit(View::Admin) != View::Admin {
            return Err(anyhow!("Admin access required."));
        }
        let api = &self.client.api;

        let text = match command {
            AdminCommand::Page => self.render(View::Admin).await,
            AdminCommand::Plans => views::plans(
                &self
                    .guarded(admin::list_plans(api).await)
                    .map_err(|e| anyhow!(failed(&e)))?,
            ),
            AdminCommand::Users => views::users(
                &self
                    .guarded(admin::list_users(api).await)
                    .map_err(|e| anyhow!(failed(&e)))?,
            ),
            AdminCommand::Create { name, price, days } => {
                let request = CreatePlanRequest {
                    name: name.trim().to_string(),
                    price,
                    duration_in_days: days,
                };
                validation::check(&request).map_err(|e| anyhow!(describe(&e)))?;
                match self.guarded(admin::create_plan(api, &request).await) {
                    Ok(_) => "Plan created successfully!".to_string(),
                    Err(e) if is_duplicate(&e) => {
                        return Err(anyhow!(
                            "Failed to create plan: A plan with this name already exists."
                        ))
                    }
                    Err(e) => {
                        return Err(anyhow!(
                            "Failed to create plan: {}",
                            e.server_message().unwrap_or("Unknown error")
                        ))
                    }
                }
            }
            AdminCommand::Activate(id) => self
                .guarded(admin::activate_plan(api, id).await)
                .map_err(|e| anyhow!(failed(&e)))?
                .message()
                .unwrap_or("Plan activated.")
                .to_string(),
            AdminCommand::Deactivate(id) => self
                .guarded(admin::deactivate_plan(api, id).await)
                .map_err(|e| anyhow!(failed(&e)))?
                .message()
                .unwrap_or("Plan deactivated.")
                .to_string(),
            AdminCommand::Delete(id) => {
                self.guarded(admin::delete_plan(api, id).await)
                    .map_err(|_| anyhow!("Failed to delete plan"))?;
                "Plan deleted successfully!".to_string()
            }
        };
        Ok(text)
    }
}

/// 409, or a 500 whose description mentions a duplicate
fn is_duplicate(err: &ApiError) -> bool {
    let mentions = |text: Option<&str>| text.map_or(false, |t| t.contains("Duplicate"));
    match err.status() {
        Some(409) => true,
        Some(500) => mentions(err.server_message()) || mentions(err.server_error()),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::parse;
    use serde_json::json;
    use std::sync::Arc;
    use subsphere_common::http::{Method, ScriptedTransport};
    use subsphere_common::session::MemoryBackend;
    use subsphere_common::AppConfig;

    fn shell(transport: Arc<ScriptedTransport>) -> Shell {
        let mut config = AppConfig::default();
        config.auth.admin_email = "ops@acme.io".into();
        Shell::new(SubsphereClient::with_parts(
            &config,
            transport,
            Arc::new(MemoryBackend::default()),
        ))
    }

    async fn run(shell: &Shell, line: &str) -> Result<String> {
        let command = parse(line)?.ok_or_else(|| anyhow!("blank"))?;
        Ok(shell.execute(command).await?.1)
    }

    #[tokio::test]
    async fn test_anonymous_dashboard_goes_to_login() {
        let transport = Arc::new(ScriptedTransport::new());
        let shell = shell(transport.clone());

        let text = run(&shell, "dashboard").await.unwrap();

        assert!(text.contains("showing /login"));
        assert_eq!(shell.client().navigator.current(), View::Login);
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_login_returns_to_requested_view() {
        let transport = Arc::new(ScriptedTransport::new());
        transport
            .respond(Method::Post, "/auth/log", 200, json!({"data": {"email": "jo@acme.io", "token": "t"}}))
            .respond(Method::Get, "/user-Subscriptions", 200, json!({"data": []}));
        let shell = shell(transport);

        let bounced = run(&shell, "subs").await.unwrap();
        assert!(bounced.contains("showing /login"));

        let text = run(&shell, "login jo@acme.io secret").await.unwrap();

        assert!(text.contains("My subscriptions"));
        assert_eq!(shell.client().navigator.current(), View::MySubscriptions);
        assert_eq!(shell.client().navigator.pending(), None);
    }

    #[tokio::test]
    async fn test_redirect_query_sets_destination() {
        let transport = Arc::new(ScriptedTransport::new());
        transport
            .respond(Method::Post, "/auth/log", 200, json!({"data": {"email": "jo@acme.io", "token": "t"}}))
            .respond(Method::Get, "/public", 200, json!({"data": []}));
        let shell = shell(transport);

        run(&shell, "goto /login?redirect=/pricing").await.unwrap();
        run(&shell, "login jo@acme.io secret").await.unwrap();

        assert_eq!(shell.client().navigator.current(), View::Pricing);
    }

    #[tokio::test]
    async fn test_register_validation_blocks_request() {
        let transport = Arc::new(ScriptedTransport::new());
        let shell = shell(transport.clone());

        let err = run(&shell, "register Acme Jo jo@acme.io weakpass").await.unwrap_err();

        assert!(err.to_string().contains("Must include at least one uppercase letter"));
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_admin_login_lands_on_admin_view() {
        let transport = Arc::new(ScriptedTransport::new());
        transport
            .respond(Method::Post, "/auth/log", 200, json!({"data": {"email": "ops@acme.io", "token": "t"}}))
            .respond(Method::Get, "/admin/plan", 200, json!({"data": []}))
            .respond(Method::Get, "/admin/users", 200, json!({"data": [{"id": 1, "email": "jo@acme.io"}]}));
        let shell = shell(transport);

        let text = run(&shell, "login ops@acme.io secret").await.unwrap();

        assert!(text.contains("Total users: 1"));
        assert_eq!(shell.client().navigator.current(), View::Admin);
    }

    #[tokio::test]
    async fn test_wrong_password_message() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(Method::Post, "/auth/log", 401, json!({}));
        let shell = shell(transport);

        let err = run(&shell, "login jo@acme.io nope").await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid email or password");
    }

    #[tokio::test]
    async fn test_subscribe_requires_login() {
        let transport = Arc::new(ScriptedTransport::new());
        let shell = shell(transport.clone());

        assert!(run(&shell, "subscribe 2").await.is_err());
        assert_eq!(transport.request_count(), 0);
    }

    #[test]
    fn test_duplicate_plan_detection() {
        assert!(is_duplicate(&ApiError::Status {
            status: 500,
            message: Some("Duplicate entry 'PRO'".into()),
            error: None,
        }));
        assert!(!is_duplicate(&ApiError::Status {
            status: 500,
            message: Some("Database down".into()),
            error: None,
        }));
    }
}
