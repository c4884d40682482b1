use anyhow::{Context as _, Result};
use clap::{Args, Subcommand};
use serde_json::Value;

use jurka_core::identity::{DisambiguationPolicy, IdentityQuery, IdentityResolver};
use jurka_core::issue::{browse_url, normalize_issue_key, CreateIssueRequest, IssueType};
use jurka_core::query::{ListFilters, QueryBuilder, DEFAULT_LIMIT};
use jurka_core::tracker::TrackerClient;

use crate::context::Context;
use crate::{browser, editor, render};

#[derive(Subcommand)]
pub enum IssueCommand {
    /// Create an issue and print its key and URL
    Create(CreateArgs),
    /// Add a comment to an issue
    Comment {
        issue_key: String,
        /// Comment text; opens $EDITOR when omitted
        #[arg(short, long)]
        body: Option<String>,
    },
    /// List issues in a project (open only by default)
    List(ListArgs),
    /// Assign an issue to a user
    Assign(AssignArgs),
    /// Remove the assignee from an issue
    Unassign { issue_key: String },
    /// Search users by email, display name or username
    Whois {
        query: String,
        /// Print matches as JSON
        #[arg(long)]
        json: bool,
    },
    /// Open an issue in the browser
    Open(OpenArgs),
}

#[derive(Args)]
pub struct CreateArgs {
    /// Project key (e.g. APP, PP)
    #[arg(short, long)]
    project: String,
    /// Issue type: Task, Bug, Story or Spike
    #[arg(short = 't', long = "type", default_value = "Task")]
    issue_type: IssueType,
    #[arg(short, long)]
    summary: String,
    #[arg(short = 'd', long = "desc")]
    description: Option<String>,
    /// Label to add; repeatable
    #[arg(short = 'l', long = "label")]
    labels: Vec<String>,
    /// Priority name (e.g. High, Low)
    #[arg(long)]
    priority: Option<String>,
    /// Print the raw JSON response
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
pub struct ListArgs {
    #[arg(short, long)]
    project: String,
    /// Include issues in every status
    #[arg(long = "all")]
    all_statuses: bool,
    /// Only issues assigned to you (ignored when --assignee is given)
    #[arg(long)]
    mine: bool,
    /// Username or email fragment; an empty value lists unassigned issues
    #[arg(long)]
    assignee: Option<String>,
    /// Extra JQL to AND onto the query
    #[arg(long = "jql")]
    extra_query: Option<String>,
    #[arg(short = 'n', long, default_value_t = DEFAULT_LIMIT)]
    limit: u32,
    /// Print the raw JSON response
    #[arg(long)]
    json: bool,
    /// Print the JQL and exit without searching
    #[arg(long)]
    dry_run: bool,
}

#[derive(Args)]
pub struct AssignArgs {
    issue_key: String,
    /// Email fragment, resolved through user search
    #[arg(long)]
    email: Option<String>,
    /// Username (Server/DC)
    #[arg(long)]
    user: Option<String>,
    /// Account id (Cloud)
    #[arg(long)]
    account_id: Option<String>,
    /// Pick the first user when --email matches several
    #[arg(long)]
    first: bool,
    /// Prefer a user whose email equals --email exactly
    #[arg(long)]
    exact: bool,
}

#[derive(Args)]
pub struct OpenArgs {
    issue_key: String,
    /// Skip checking that the issue exists
    #[arg(long)]
    no_validate: bool,
    /// Browser to use instead of the platform default
    #[arg(long)]
    browser: Option<String>,
    /// Print the URL without opening it
    #[arg(long)]
    print: bool,
}

pub fn run(ctx: &Context, command: IssueCommand) -> Result<()> {
    match command {
        IssueCommand::Create(args) => create(ctx, args),
        IssueCommand::Comment { issue_key, body } => comment(ctx, &issue_key, body),
        IssueCommand::List(args) => list(ctx, args),
        IssueCommand::Assign(args) => assign(ctx, args),
        IssueCommand::Unassign { issue_key } => unassign(ctx, &issue_key),
        IssueCommand::Whois { query, json } => whois(ctx, &query, json),
        IssueCommand::Open(args) => open(ctx, args),
    }
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn create(ctx: &Context, args: CreateArgs) -> Result<()> {
    let credential = ctx.credential()?;
    let request = CreateIssueRequest {
        project_key: args.project.trim().to_string(),
        summary: args.summary,
        issue_type: args.issue_type,
        description: args.description,
        labels: args.labels,
        priority: args.priority,
    };
    let created = ctx
        .tracker()?
        .create_issue(&credential, &request)
        .context("create issue")?;
    if args.json {
        return print_json(&created);
    }
    match created.get("key").and_then(Value::as_str) {
        Some(key) => {
            println!("Created: {key}");
            println!("{}", browse_url(credential.base_url(), key));
        }
        None => println!("Unexpected response: {created}"),
    }
    Ok(())
}

fn comment(ctx: &Context, issue_key: &str, body: Option<String>) -> Result<()> {
    let issue_key = normalize_issue_key(issue_key)?;
    let credential = ctx.credential()?;
    let body = match body.filter(|body| !body.trim().is_empty()) {
        Some(body) => body,
        None => match editor::edit_comment()? {
            Some(body) => body,
            None => {
                println!("Aborted: no comment provided.");
                return Ok(());
            }
        },
    };
    let added = ctx
        .tracker()?
        .add_comment(&credential, &issue_key, &body)
        .with_context(|| format!("comment on {issue_key}"))?;
    let id = added.get("id").and_then(Value::as_str).unwrap_or("?");
    println!("Comment {id} added to {issue_key}");
    Ok(())
}

fn list(ctx: &Context, args: ListArgs) -> Result<()> {
    let credential = ctx.credential()?;
    let tracker = ctx.tracker()?;
    let filters = ListFilters {
        project: args.project,
        mine: args.mine,
        include_all_statuses: args.all_statuses,
        assignee_raw: args.assignee,
        extra_query: args.extra_query,
        limit: args.limit,
    };
    filters.validate()?;

    let principal = if filters.needs_current_principal() {
        Some(
            tracker
                .myself(&credential)
                .context("resolve current user for --mine")?,
        )
    } else {
        None
    };
    let identities = IdentityResolver::new(&tracker, &credential);
    let jql = QueryBuilder::new(&identities).build(&filters, principal.as_ref())?;
    if args.dry_run {
        println!("{jql}");
        return Ok(());
    }

    let result = tracker
        .list_issues(&credential, &jql, filters.limit)
        .context("search issues")?;
    if args.json {
        return print_json(&result);
    }
    print!("{}", render::issue_table(&result));
    Ok(())
}

fn assign(ctx: &Context, args: AssignArgs) -> Result<()> {
    let issue_key = normalize_issue_key(&args.issue_key)?;
    let query = IdentityQuery::from_parts(
        args.account_id.as_deref(),
        args.user.as_deref(),
        args.email.as_deref(),
    )?;
    let policy = if args.first {
        DisambiguationPolicy::TakeFirst
    } else {
        DisambiguationPolicy::FailOnMultiple
    };
    let credential = ctx.credential()?;
    let tracker = ctx.tracker()?;
    let assignee = IdentityResolver::new(&tracker, &credential)
        .prefer_exact_email(args.exact)
        .resolve(&query, policy)?;
    tracker
        .assign_issue(&credential, &issue_key, Some(&assignee))
        .with_context(|| format!("assign {issue_key}"))?;
    println!("Assigned {issue_key} -> {}", render::principal_line(&assignee));
    Ok(())
}

fn unassign(ctx: &Context, issue_key: &str) -> Result<()> {
    let issue_key = normalize_issue_key(issue_key)?;
    let credential = ctx.credential()?;
    ctx.tracker()?
        .assign_issue(&credential, &issue_key, None)
        .with_context(|| format!("unassign {issue_key}"))?;
    println!("Unassigned {issue_key}");
    Ok(())
}

fn whois(ctx: &Context, query: &str, json: bool) -> Result<()> {
    let credential = ctx.credential()?;
    let users = ctx
        .tracker()?
        .search_users(&credential, query)
        .context("search users")?;
    if json {
        return print_json(&serde_json::to_value(&users)?);
    }
    if users.is_empty() {
        println!("No matching users found.");
        return Ok(());
    }
    print!("{}", render::user_table(&users));
    Ok(())
}

fn open(ctx: &Context, args: OpenArgs) -> Result<()> {
    let issue_key = normalize_issue_key(&args.issue_key)?;
    let base_url = if args.no_validate {
        ctx.base_url()?.0
    } else {
        let credential = ctx.credential()?;
        ctx.tracker()?
            .get_issue(&credential, &issue_key)
            .with_context(|| format!("look up {issue_key}"))?;
        credential.base_url().to_string()
    };
    let url = browse_url(&base_url, &issue_key);
    println!("{url}");
    if !args.print {
        browser::open_url(&url, args.browser.as_deref())?;
    }
    Ok(())
}
