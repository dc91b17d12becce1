//! Console command grammar

use anyhow::{anyhow, bail, Context, Result};
use chrono::NaiveDate;
use subsphere_common::models::BillingCycle;

pub const HELP: &str = "\
Commands:
  login <email> <password>                       sign in
  register <company> <name> <email> <password> [confirm]
                                                 create a tenant account
  logout                                         sign out
  whoami                                         show the signed-in account
  goto <path>                                    open a view (/, /pricing, /dashboard, ...)
  pricing                                        list public plans
  subscribe <plan-id>                            subscribe the tenant to a plan
  subscription                                   show the tenant subscription
  unsubscribe                                    cancel the tenant subscription
  dashboard                                      developer dashboard overview
  console                                        developer console details
  subs                                           personal subscriptions page
  subs list [active | category <id>]
  subs add <name> <amount> <cycle> <start> [category-id] [notes]
  subs update <id> <name> <amount> <cycle> <start> [category-id] [notes]
  subs cancel <id>
  subs upcoming [days]
  subs stats | subs insights | subs categories
  admin                                          admin dashboard
  admin plans | admin users
  admin create <name> <price> <days>
  admin activate <id> | admin deactivate <id> | admin delete <id>
  help                                           show this help
  quit | exit                                    leave the console

Arguments containing spaces can be quoted: register \"Acme Labs\" \"Jo Doe\" ...";

/// Fields of a tracked subscription as typed on the command line
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedArgs {
    pub name: String,
    pub amount: f64,
    pub cycle: BillingCycle,
    pub start_date: NaiveDate,
    pub category_id: Option<i64>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubsCommand {
    Page,
    List,
    Active,
    ByCategory(i64),
    Add(TrackedArgs),
    Update(i64, TrackedArgs),
    Cancel(i64),
    Upcoming(u32),
    Stats,
    Insights,
    Categories,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AdminCommand {
    Page,
    Plans,
    Users,
    Create { name: String, price: f64, days: u32 },
    Activate(i64),
    Deactivate(i64),
    Delete(i64),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Help,
    Quit,
    Login { email: String, password: String },
    Register {
        tenant_name: String,
        user_name: String,
        email: String,
        password: String,
        confirm: Option<String>,
    },
    Logout,
    WhoAmI,
    Goto(String),
    Pricing,
    Subscribe(i64),
    Subscription,
    Unsubscribe,
    Dashboard,
    Console,
    Subs(SubsCommand),
    Admin(AdminCommand),
}

/// Split a line into words, honouring double quotes
pub fn tokenize(line: &str) -> Result<Vec<String>> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut started = false;

    for c in line.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                started = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if started {
                    words.push(std::mem::take(&mut current));
                    started = false;
                }
            }
            c => {
                current.push(c);
                started = true;
            }
        }
    }

    if in_quotes {
        bail!("unterminated quote");
    }
    if started {
        words.push(current);
    }
    Ok(words)
}

fn id(raw: Option<&String>, what: &str) -> Result<i64> {
    let raw = raw.ok_or_else(|| anyhow!("missing {}", what))?;
    raw.parse()
        .with_context(|| format!("{} must be a number, got '{}'", what, raw))
}

fn arg<'a>(words: &'a [String], index: usize, what: &str) -> Result<&'a str> {
    words
        .get(index)
        .map(String::as_str)
        .ok_or_else(|| anyhow!("missing {}", what))
}

fn tracked_args(words: &[String]) -> Result<TrackedArgs> {
    let name = arg(words, 0, "name")?.to_string();
    let amount_raw = arg(words, 1, "amount")?;
    let amount = amount_raw
        .parse()
        .with_context(|| format!("amount must be a number, got '{}'", amount_raw))?;
    let cycle = arg(words, 2, "billing cycle")?
        .parse::<BillingCycle>()
        .map_err(|e| anyhow!(e))?;
    let start_raw = arg(words, 3, "start date")?;
    let start_date = NaiveDate::parse_from_str(start_raw, "%Y-%m-%d")
        .with_context(|| format!("start date must be YYYY-MM-DD, got '{}'", start_raw))?;
    let category_id = match words.get(4) {
        Some(raw) if raw != "-" => Some(id(Some(raw), "category id")?),
        _ => None,
    };
    let notes = match words.get(5..) {
        Some(rest) if !rest.is_empty() => Some(rest.join(" ")),
        _ => None,
    };

    Ok(TrackedArgs {
        name,
        amount,
        cycle,
        start_date,
        category_id,
        notes,
    })
}

fn parse_subs(words: &[String]) -> Result<SubsCommand> {
    let Some(sub) = words.first() else {
        return Ok(SubsCommand::Page);
    };
    let rest = &words[1..];

    match sub.as_str() {
        "list" => match rest.first().map(String::as_str) {
            None => Ok(SubsCommand::List),
            Some("active") => Ok(SubsCommand::Active),
            Some("category") => Ok(SubsCommand::ByCategory(id(rest.get(1), "category id")?)),
            Some(other) => bail!("unknown list filter '{}'", other),
        },
        "add" => Ok(SubsCommand::Add(tracked_args(rest)?)),
        "update" => {
            let target = id(rest.first(), "subscription id")?;
            Ok(SubsCommand::Update(target, tracked_args(&rest[1..])?))
        }
        "cancel" => Ok(SubsCommand::Cancel(id(rest.first(), "subscription id")?)),
        "upcoming" => {
            let days = match rest.first() {
                Some(raw) => raw
                    .parse()
                    .with_context(|| format!("days must be a number, got '{}'", raw))?,
                None => subsphere_common::api::tracker::DEFAULT_UPCOMING_DAYS,
            };
            Ok(SubsCommand::Upcoming(days))
        }
        "stats" => Ok(SubsCommand::Stats),
        "insights" => Ok(SubsCommand::Insights),
        "categories" => Ok(SubsCommand::Categories),
        other => bail!("unknown subs command '{}'", other),
    }
}

fn parse_admin(words: &[String]) -> Result<AdminCommand> {
    let Some(sub) = words.first() else {
        return Ok(AdminCommand::Page);
    };
    let rest = &words[1..];

    match sub.as_str() {
        "plans" => Ok(AdminCommand::Plans),
        "users" => Ok(AdminCommand::Users),
        "create" => {
            let name = arg(rest, 0, "plan name")?.to_string();
            let price_raw = arg(rest, 1, "price")?;
            let days_raw = arg(rest, 2, "duration in days")?;
            Ok(AdminCommand::Create {
                name,
                price: price_raw
                    .parse()
                    .with_context(|| format!("price must be a number, got '{}'", price_raw))?,
                days: days_raw
                    .parse()
                    .with_context(|| format!("duration must be a whole number, got '{}'", days_raw))?,
            })
        }
        "activate" => Ok(AdminCommand::Activate(id(rest.first(), "plan id")?)),
        "deactivate" => Ok(AdminCommand::Deactivate(id(rest.first(), "plan id")?)),
        "delete" => Ok(AdminCommand::Delete(id(rest.first(), "plan id")?)),
        other => bail!("unknown admin command '{}'", other),
    }
}

/// Parse one console line; `Ok(None)` for blank lines
pub fn parse(line: &str) -> Result<Option<Command>> {
    let words = tokenize(line)?;
    let Some(head) = words.first() else {
        return Ok(None);
    };
    let rest = &words[1..];

    let command = match head.as_str() {
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        "login" => Command::Login {
            email: arg(rest, 0, "email")?.to_string(),
            password: arg(rest, 1, "password")?.to_string(),
        },
        "register" => Command::Register {
            tenant_name: arg(rest, 0, "company name")?.to_string(),
            user_name: arg(rest, 1, "your name")?.to_string(),
            email: arg(rest, 2, "email")?.to_string(),
            password: arg(rest, 3, "password")?.to_string(),
            confirm: rest.get(4).cloned(),
        },
        "logout" => Command::Logout,
        "whoami" => Command::WhoAmI,
        "goto" => Command::Goto(arg(rest, 0, "path")?.to_string()),
        "pricing" | "plans" => Command::Pricing,
        "subscribe" => Command::Subscribe(id(rest.first(), "plan id")?),
        "subscription" => Command::Subscription,
        "unsubscribe" => Command::Unsubscribe,
        "dashboard" => Command::Dashboard,
        "console" => Command::Console,
        "subs" => Command::Subs(parse_subs(rest)?),
        "admin" => Command::Admin(parse_admin(rest)?),
        other => bail!("unknown command '{}' (try 'help')", other),
    };
    Ok(Some(command))
}
