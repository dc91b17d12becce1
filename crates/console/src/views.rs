//! Text renderings of the console views

use chrono::NaiveDate;
use std::fmt::Write;
use subsphere_common::api::overview::{DashboardData, PersonalData};
use subsphere_common::errors::Result;
use subsphere_common::models::{
    AdminUser, Category, DeveloperConsole, Insight, Plan, SubscriptionStats, TenantSubscription,
    TrackedSubscription,
};

pub fn currency(amount: f64) -> String {
    format!("₹{:.2}", amount)
}

pub fn date(value: Option<NaiveDate>) -> String {
    value
        .map(|d| d.format("%b %-d, %Y").to_string())
        .unwrap_or_else(|| "N/A".to_string())
}

/// Section that failed to load; the rest of the page still renders
fn unavailable<T>(out: &mut String, title: &str, result: &Result<T>) -> bool {
    if let Err(e) = result {
        let _ = writeln!(out, "{}: unavailable ({})", title, e.user_message());
        return true;
    }
    false
}

pub fn plans(plans: &[Plan]) -> String {
    if plans.is_empty() {
        return "No plans available.\n".to_string();
    }
    let mut out = String::new();
    for plan in plans {
        let _ = writeln!(
            out,
            "[{}] {}{} {}{}{}",
            plan.id,
            plan.name,
            if plan.is_featured() { " *" } else { "" },
            currency(plan.price),
            plan.period_label(),
            if plan.active { "" } else { " (inactive)" },
        );
        for feature in &plan.features {
            let mark = if feature.included { "+" } else { "-" };
            let _ = writeln!(out, "      {} {}", mark, feature.text);
        }
    }
    out
}

pub fn tenant_subscription(subscription: Option<&TenantSubscription>) -> String {
    match subscription {
        None => "No active plan. Run 'pricing' to choose one.\n".to_string(),
        Some(sub) => format!(
            "Plan: {} ({})\n  {} to {}\n",
            sub.plan_name().unwrap_or("unknown"),
            sub.status,
            date(sub.start_date),
            date(sub.end_date),
        ),
    }
}

pub fn tracked(subs: &[TrackedSubscription]) -> String {
    if subs.is_empty() {
        return "No subscriptions tracked yet.\n".to_string();
    }
    let mut out = String::new();
    for sub in subs {
        let _ = writeln!(
            out,
            "[{}] {} {} {} next {} {}{}",
            sub.id,
            sub.subscription_name,
            currency(sub.amount),
            sub.billing_cycle,
            date(sub.next_billing_date),
            sub.status,
            sub.subscription_category
                .as_ref()
                .map(|c| format!(" #{}", c.name))
                .unwrap_or_default(),
        );
    }
    out
}

pub fn renewals(subs: &[TrackedSubscription]) -> String {
    if subs.is_empty() {
        return "No upcoming renewals.\n".to_string();
    }
    let mut out = String::new();
    for sub in subs {
        let _ = writeln!(
            out,
            "  {} renews on {} for {}",
            sub.subscription_name,
            date(sub.next_billing_date),
            currency(sub.amount)
        );
    }
    out
}

pub fn stats(stats: Option<&SubscriptionStats>) -> String {
    let total = stats.and_then(|s| s.total_monthly_cost).unwrap_or(0.0);
    let active = stats
        .and_then(|s| s.extra.get("activeCount"))
        .and_then(|v| v.as_u64())
        .unwrap_or(0);
    format!("Monthly spend: {}   Active: {}\n", currency(total), active)
}

pub fn insights(insights: &[Insight]) -> String {
    let mut out = String::new();
    for insight in insights {
        if let Some(text) = insight.text() {
            let _ = writeln!(out, "  * {}", text);
        }
    }
    out
}

pub fn categories(categories: &[Category]) -> String {
    let mut out = String::new();
    for category in categories {
        let _ = writeln!(out, "[{}] {}", category.id, category.name);
    }
    out
}

pub fn developer_console(console: Option<&DeveloperConsole>) -> String {
    let Some(console) = console else {
        return "Developer console is empty.\n".to_string();
    };
    let mut out = String::new();
    for name in console.section_names() {
        let body = console
            .section(name)
            .and_then(|v| serde_json::to_string_pretty(v).ok())
            .unwrap_or_default();
        let _ = writeln!(out, "== {} ==\n{}", name, body);
    }
    out
}

pub fn users(users: &[AdminUser]) -> String {
    let mut out = String::new();
    for user in users {
        let _ = writeln!(
            out,
            "[{}] {} <{}> {}",
            user.id.map(|id| id.to_string()).unwrap_or_else(|| "-".into()),
            user.name.as_deref().unwrap_or(""),
            user.email,
            user.role.as_deref().unwrap_or(""),
        );
    }
    out
}

pub fn dashboard(email: &str, data: &DashboardData) -> String {
    let mut out = format!("Developer dashboard for {}\n\n", email);

    if !unavailable(&mut out, "Plan", &data.plan_subscription) {
        if let Ok(sub) = &data.plan_subscription {
            out.push_str(&tenant_subscription(sub.as_ref()));
        }
    }
    if !unavailable(&mut out, "Stats", &data.stats) {
        if let Ok(s) = &data.stats {
            out.push_str(&stats(s.as_ref()));
        }
    }
    if !unavailable(&mut out, "Subscriptions", &data.personal) {
        out.push_str("\nRecent subscriptions\n");
        out.push_str(&tracked(data.personal_preview()));
    }
    if let Ok(items) = &data.insights {
        if !items.is_empty() {
            out.push_str("\nInsights\n");
            out.push_str(&insights(items));
        }
    }
    if !unavailable(&mut out, "Renewals", &data.upcoming) {
        if let Ok(items) = &data.upcoming {
            out.push_str("\nUpcoming renewals\n");
            out.push_str(&renewals(items));
        }
    }
    out
}

pub fn personal(data: &PersonalData) -> String {
    let mut out = String::from("My subscriptions\n\n");

    if let Ok(s) = &data.stats {
        out.push_str(&stats(s.as_ref()));
    }
    if let Ok(items) = &data.upcoming {
        let _ = writeln!(out, "Renewing in the next 7 days: {}", items.len());
    }
    if let Ok(items) = &data.insights {
        if !items.is_empty() {
            out.push_str("\nInsights\n");
            out.push_str(&insights(items));
        }
    }
    out.push('\n');
    if !unavailable(&mut out, "Subscriptions", &data.subscriptions) {
        if let Ok(items) = &data.subscriptions {
            out.push_str(&tracked(items));
        }
    }
    out
}
