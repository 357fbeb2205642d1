//! AgenticTrust CLI: `atrust` command.
//!
//! Issues, verifies, links and revokes agent identities stored under a
//! trust home directory, and answers discovery and policy queries.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use agentic_trust::storage::{load_issuer, read_issuer_public_key, save_issuer};
use agentic_trust::{
    Caller, CredentialIssuer, DiscoveryFilter, EngineConfig, FileStore, Identity, IdentityId,
    PolicyDocument, RequestContext, RevocationReason, ScopeConfig, TrustEngine,
};

const PASSPHRASE_ENV: &str = "ATRUST_PASSPHRASE";

// ── Directory helpers ─────────────────────────────────────────────────────────

fn default_home() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".agentic").join("trust")
}

fn config_path(home: &Path) -> PathBuf {
    home.join("config.json")
}

fn issuer_path(home: &Path) -> PathBuf {
    home.join("issuer.key")
}

// ── Passphrase helper ─────────────────────────────────────────────────────────

fn read_passphrase(prompt: &str) -> Result<String> {
    if let Ok(p) = std::env::var(PASSPHRASE_ENV) {
        return Ok(p);
    }
    eprint!("{prompt}");
    let mut passphrase = String::new();
    std::io::stdin()
        .read_line(&mut passphrase)
        .context("failed to read passphrase")?;
    Ok(passphrase.trim().to_string())
}

// ── Time formatting helpers ───────────────────────────────────────────────────

fn micros_to_datetime(micros: u64) -> String {
    let secs = (micros / 1_000_000) as i64;
    chrono::DateTime::from_timestamp(secs, 0)
        .unwrap_or(chrono::DateTime::UNIX_EPOCH)
        .format("%Y-%m-%d %H:%M:%S UTC")
        .to_string()
}

// ── CLI structure ─────────────────────────────────────────────────────────────

/// AgenticTrust CLI: issue and verify agent identities, link them into a
/// trust graph, and check their access policies.
#[derive(Parser, Debug)]
#[command(
    name = "atrust",
    about = "AgenticTrust CLI",
    version,
    long_about = "atrust — AgenticTrust CLI\n\nIssue, verify, link and revoke agent identities scoped by trust domain,\nand evaluate their access policies."
)]
struct Cli {
    /// Trust home directory (default: ~/.agentic/trust)
    #[arg(long, global = true)]
    home: Option<PathBuf>,

    /// Enable verbose output and debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create the issuer key and default configuration
    Init {
        /// Overwrite an existing issuer key
        #[arg(long)]
        force: bool,
    },

    /// List whitelisted trust domains
    Domains,

    /// Issue a new identity
    Issue {
        /// Identity name
        name: String,
        #[command(flatten)]
        scope: ScopeArgs,
    },

    /// Mint a fresh credential, optionally replacing scope and edges
    Reissue {
        /// Identity ID
        id: String,
        #[command(flatten)]
        scope: ScopeArgs,
    },

    /// Revoke an identity
    Revoke {
        /// Identity ID
        id: String,
        /// Reason (compromised, policy_violation, decommissioned, manual, or free text)
        #[arg(long, default_value = "manual")]
        reason: String,
    },

    /// Show one identity, or list all
    Show {
        /// Identity ID (omit to list every identity)
        id: Option<String>,
        /// Look up by name instead of ID
        #[arg(long, conflicts_with = "id")]
        name: Option<String>,
        /// Trust domain for --name (omit for the global namespace)
        #[arg(long, requires = "name")]
        domain: Option<String>,
    },

    /// Verify an identity by ID, credential token or name
    Verify {
        /// Identity ID
        #[arg(long, conflicts_with_all = ["token", "name"])]
        id: Option<String>,
        /// Credential token
        #[arg(long, conflicts_with = "name")]
        token: Option<String>,
        /// Identity name
        #[arg(long)]
        name: Option<String>,
        /// Trust domain for --name
        #[arg(long, requires = "name")]
        domain: Option<String>,
    },

    /// Check whether a directed trust path exists
    Connect {
        /// Source identity ID
        from: String,
        /// Target identity ID
        to: String,
        /// Print the path
        #[arg(long)]
        path: bool,
    },

    /// List identities visible to a caller
    Discover {
        /// Caller identity ID
        #[arg(long = "as", conflicts_with = "token")]
        as_id: Option<String>,
        /// Caller credential token
        #[arg(long)]
        token: Option<String>,
        /// Restrict to one trust domain (requires --requestor)
        #[arg(long, requires = "requestor")]
        domain: Option<String>,
        /// Requestor identity ID for --domain
        #[arg(long, requires = "domain")]
        requestor: Option<String>,
        /// Include revoked identities in domain results
        #[arg(long)]
        include_revoked: bool,
    },

    /// Inspect and evaluate policies
    Policy {
        #[command(subcommand)]
        subcommand: PolicyCommands,
    },
}

#[derive(clap::Args, Debug, Default)]
struct ScopeArgs {
    /// Global identity (no trust domain)
    #[arg(long, conflicts_with = "domain")]
    global: bool,
    /// Trust domain for a scoped identity
    #[arg(long)]
    domain: Option<String>,
    /// Parent identity ID
    #[arg(long)]
    parent: Option<String>,
    /// Link target identity ID (repeatable)
    #[arg(long = "link")]
    links: Vec<String>,
    /// Approved requester trust domain (repeatable)
    #[arg(long = "approve")]
    approve: Vec<String>,
    /// Policy document JSON file (repeatable)
    #[arg(long = "policy")]
    policies: Vec<PathBuf>,
}

impl ScopeArgs {
    fn is_empty(&self) -> bool {
        !self.global
            && self.domain.is_none()
            && self.parent.is_none()
            && self.links.is_empty()
            && self.approve.is_empty()
            && self.policies.is_empty()
    }

    fn to_config(&self) -> Result<ScopeConfig> {
        let mut config = match &self.domain {
            Some(d) => ScopeConfig::domain(d.clone()),
            None if self.global => ScopeConfig::global(),
            None => return Err(anyhow!("either --global or --domain is required")),
        };
        if let Some(p) = &self.parent {
            config = config.parent(IdentityId::from(p.as_str()));
        }
        config = config.links(self.links.iter().map(|l| IdentityId::from(l.as_str())));
        for d in &self.approve {
            config = config.approve_domain(d.clone());
        }
        for path in &self.policies {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read policy file {}", path.display()))?;
            let doc: PolicyDocument = serde_json::from_str(&raw)
                .with_context(|| format!("invalid policy document {}", path.display()))?;
            config = config.policy(doc);
        }
        Ok(config)
    }
}

#[derive(Subcommand, Debug)]
enum PolicyCommands {
    /// Show the policies attached to an identity
    Show {
        /// Identity ID
        id: String,
    },

    /// Check whether an identity may perform an action
    Check {
        /// Identity ID
        id: String,
        /// Action, e.g. read:articles
        action: String,
        /// Context entry key=value (repeatable; numeric values parsed as numbers)
        #[arg(long = "context")]
        context: Vec<String>,
        /// Add the current hour and time to the context
        #[arg(long)]
        now: bool,
    },
}

// ── Main entry point ──────────────────────────────────────────────────────────

struct Ctx {
    home: PathBuf,
    verbose: bool,
    json: bool,
}

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let ctx = Ctx {
        home: cli.home.unwrap_or_else(default_home),
        verbose: cli.verbose,
        json: cli.json,
    };

    let result = match cli.command {
        Commands::Init { force } => cmd_init(&ctx, force),
        Commands::Domains => cmd_domains(&ctx),
        Commands::Issue { name, scope } => cmd_issue(&ctx, &name, &scope),
        Commands::Reissue { id, scope } => cmd_reissue(&ctx, &id, &scope),
        Commands::Revoke { id, reason } => cmd_revoke(&ctx, &id, &reason),
        Commands::Show { id, name, domain } => {
            cmd_show(&ctx, id.as_deref(), name.as_deref(), domain.as_deref())
        }
        Commands::Verify {
            id,
            token,
            name,
            domain,
        } => cmd_verify(
            &ctx,
            id.as_deref(),
            token.as_deref(),
            name.as_deref(),
            domain.as_deref(),
        ),
        Commands::Connect { from, to, path } => cmd_connect(&ctx, &from, &to, path),
        Commands::Discover {
            as_id,
            token,
            domain,
            requestor,
            include_revoked,
        } => cmd_discover(
            &ctx,
            as_id.as_deref(),
            token.as_deref(),
            domain.as_deref(),
            requestor.as_deref(),
            include_revoked,
        ),
        Commands::Policy { subcommand } => match subcommand {
            PolicyCommands::Show { id } => cmd_policy_show(&ctx, &id),
            PolicyCommands::Check {
                id,
                action,
                context,
                now,
            } => cmd_policy_check(&ctx, &id, &action, &context, now),
        },
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

// ── Shared helpers ────────────────────────────────────────────────────────────

fn load_config(ctx: &Ctx) -> Result<EngineConfig> {
    let config = EngineConfig::load(&config_path(&ctx.home))
        .context("failed to load config")?
        .apply_env();
    Ok(config)
}

fn open_engine(ctx: &Ctx) -> Result<TrustEngine<FileStore>> {
    let key_path = issuer_path(&ctx.home);
    if !key_path.exists() {
        return Err(anyhow!(
            "no issuer key at {} (run `atrust init` first)",
            key_path.display()
        ));
    }
    let passphrase = read_passphrase("Issuer passphrase: ")?;
    let issuer = load_issuer(&key_path, &passphrase).context("failed to load issuer key")?;
    let store = FileStore::new(&ctx.home).context("failed to open identity store")?;
    Ok(TrustEngine::new(store, issuer, load_config(ctx)?)?)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_identity(ctx: &Ctx, identity: &Identity) {
    println!("Identity: {}", identity.name);
    println!("  ID:         {}", identity.id);
    println!("  Scope:      {}", identity.scope);
    println!("  State:      {:?}", identity.state);
    println!("  Generation: {}", identity.credential.generation);
    println!("  Issued:     {}", micros_to_datetime(identity.credential.issued_at));
    if let Some(exp) = identity.credential.expires_at {
        println!("  Expires:    {}", micros_to_datetime(exp));
    }
    if let Some(p) = &identity.parent {
        println!("  Parent:     {p}");
    }
    for link in &identity.links {
        println!("  Link:       {link}");
    }
    if !identity.approved_trust_domains.is_empty() {
        println!(
            "  Approved:   {}",
            identity.approved_trust_domains.join(", ")
        );
    }
    println!("  Policies:   {}", identity.policies.len());
    if let Some(rev) = &identity.revocation {
        println!(
            "  Revoked:    {} ({})",
            micros_to_datetime(rev.revoked_at),
            rev.reason.as_str()
        );
    }
    if ctx.verbose {
        println!("  Token:      {}", identity.credential.token);
        println!("  Fingerprint: {}", identity.credential.fingerprint);
        println!("  Created:    {}", micros_to_datetime(identity.created_at));
    }
}

fn parse_context(entries: &[String], now: bool) -> Result<RequestContext> {
    let mut ctx = RequestContext::new();
    for entry in entries {
        let (key, value) = entry
            .split_once('=')
            .ok_or_else(|| anyhow!("context entry must be key=value: {entry}"))?;
        match value.parse::<f64>() {
            Ok(n) => ctx.insert(key, n),
            Err(_) => ctx.insert(key, value),
        }
    }
    if now {
        ctx = ctx.with_time(chrono::Utc::now());
    }
    Ok(ctx)
}

// ── Command implementations ───────────────────────────────────────────────────

/// `atrust init [--force]`
fn cmd_init(ctx: &Ctx, force: bool) -> Result<()> {
    let key_path = issuer_path(&ctx.home);
    if key_path.exists() && !force {
        return Err(anyhow!(
            "issuer key already exists at {} (use --force to replace it)",
            key_path.display()
        ));
    }
    std::fs::create_dir_all(&ctx.home).context("failed to create trust home")?;

    let passphrase = read_passphrase("Enter passphrase for the issuer key: ")?;
    if passphrase.is_empty() {
        return Err(anyhow!("passphrase cannot be empty"));
    }
    if std::env::var(PASSPHRASE_ENV).is_err() {
        let confirm = read_passphrase("Confirm passphrase: ")?;
        if passphrase != confirm {
            return Err(anyhow!("passphrases do not match"));
        }
    }

    let issuer = CredentialIssuer::generate();
    save_issuer(&issuer, &key_path, &passphrase).context("failed to save issuer key")?;

    let cfg_path = config_path(&ctx.home);
    if !cfg_path.exists() {
        EngineConfig::default()
            .save(&cfg_path)
            .context("failed to write config")?;
    }
    FileStore::new(&ctx.home).context("failed to create identity store")?;

    if ctx.json {
        return print_json(&serde_json::json!({
            "home": ctx.home,
            "public_key": issuer.public_key_base64(),
        }));
    }
    println!("Initialized trust home at {}", ctx.home.display());
    println!("  Issuer key: {}", issuer.public_key_base64());
    if ctx.verbose {
        println!("  Key file:   {}", key_path.display());
        println!("  Config:     {}", cfg_path.display());
    }
    Ok(())
}

/// `atrust domains`
fn cmd_domains(ctx: &Ctx) -> Result<()> {
    let config = load_config(ctx)?;
    if ctx.json {
        return print_json(&config.trust_domains);
    }
    println!("Whitelisted trust domains:");
    for d in config.trust_domains.iter() {
        println!("  {d}");
    }
    if ctx.verbose {
        if let Ok(key) = read_issuer_public_key(&issuer_path(&ctx.home)) {
            println!("Issuer key: {key}");
        }
    }
    Ok(())
}

/// `atrust issue NAME (--global | --domain D) [...]`
fn cmd_issue(ctx: &Ctx, name: &str, scope: &ScopeArgs) -> Result<()> {
    let config = scope.to_config()?;
    let engine = open_engine(ctx)?;
    let identity = engine.issue(name, &config)?;

    if ctx.json {
        return print_json(&identity);
    }
    println!("Issued identity '{}'", identity.name);
    println!("  ID:    {}", identity.id);
    println!("  Scope: {}", identity.scope);
    println!("  Token: {}", identity.credential.token);
    Ok(())
}

/// `atrust reissue ID [scope flags]`
fn cmd_reissue(ctx: &Ctx, id: &str, scope: &ScopeArgs) -> Result<()> {
    let config = if scope.is_empty() {
        None
    } else {
        Some(scope.to_config()?)
    };
    let engine = open_engine(ctx)?;
    let identity = engine.reissue(&IdentityId::from(id), config.as_ref())?;

    if ctx.json {
        return print_json(&identity);
    }
    println!(
        "Reissued {} at generation {}",
        identity.id, identity.credential.generation
    );
    println!("  Token: {}", identity.credential.token);
    Ok(())
}

/// `atrust revoke ID [--reason R]`
fn cmd_revoke(ctx: &Ctx, id: &str, reason: &str) -> Result<()> {
    let engine = open_engine(ctx)?;
    let record = engine.revoke(&IdentityId::from(id), RevocationReason::parse(reason))?;

    if ctx.json {
        return print_json(&record);
    }
    println!("Revoked {}", record.identity_id);
    println!("  Reason:     {}", record.reason.as_str());
    println!("  Generation: {}", record.generation);
    println!("  At:         {}", micros_to_datetime(record.revoked_at));
    Ok(())
}

/// `atrust show [ID | --name N [--domain D]]`
fn cmd_show(ctx: &Ctx, id: Option<&str>, name: Option<&str>, domain: Option<&str>) -> Result<()> {
    let engine = open_engine(ctx)?;

    let identity = match (id, name) {
        (Some(id), _) => engine.get_identity(&IdentityId::from(id))?,
        (None, Some(name)) => engine.get_identity_by_name(name, domain)?,
        (None, None) => {
            let all = engine.list_identities()?;
            if ctx.json {
                return print_json(&all);
            }
            if all.is_empty() {
                println!("No identities issued");
            }
            for i in &all {
                println!(
                    "{:<24} {:<28} {:<24} {:?}",
                    i.name,
                    i.id.to_string(),
                    i.scope.to_string(),
                    i.state
                );
            }
            return Ok(());
        }
    };

    if ctx.json {
        return print_json(&identity);
    }
    print_identity(ctx, &identity);
    Ok(())
}

/// `atrust verify (--id ID | --token T | --name N [--domain D])`
fn cmd_verify(
    ctx: &Ctx,
    id: Option<&str>,
    token: Option<&str>,
    name: Option<&str>,
    domain: Option<&str>,
) -> Result<()> {
    let engine = open_engine(ctx)?;

    let checked = match (id, token, name) {
        (Some(id), _, _) => engine
            .get_identity(&IdentityId::from(id))
            .and_then(|record| engine.verifier().check_identity(&record)),
        (_, Some(token), _) => engine.verify_credential(token),
        (_, _, Some(name)) => engine
            .get_identity_by_name(name, domain)
            .and_then(|record| engine.verifier().check_identity(&record)),
        _ => return Err(anyhow!("one of --id, --token or --name is required")),
    };

    if ctx.json {
        let report = match &checked {
            Ok(identity) => serde_json::json!({ "valid": true, "identity": identity.id }),
            Err(e) => serde_json::json!({ "valid": false, "error": e.kind(), "message": e.to_string() }),
        };
        print_json(&report)?;
    } else if let Ok(identity) = &checked {
        println!("Verification: VALID");
        println!("  ID:         {}", identity.id);
        println!("  Name:       {}", identity.name);
        println!("  Scope:      {}", identity.scope);
        println!("  Generation: {}", identity.credential.generation);
    }

    match checked {
        Ok(_) => Ok(()),
        Err(e) => Err(anyhow!("verification failed: {e}")),
    }
}

/// `atrust connect FROM TO [--path]`
fn cmd_connect(ctx: &Ctx, from: &str, to: &str, show_path: bool) -> Result<()> {
    let engine = open_engine(ctx)?;
    let from = IdentityId::from(from);
    let to = IdentityId::from(to);
    let path = engine.connection_path(&from, &to)?;

    if ctx.json {
        return print_json(&serde_json::json!({
            "from": from,
            "to": to,
            "connected": path.is_some(),
            "path": path,
        }));
    }
    match path {
        Some(path) => {
            println!("{from} -> {to}: connected ({} hop(s))", path.len() - 1);
            if show_path {
                for (i, hop) in path.iter().enumerate() {
                    println!("  [{i}] {hop}");
                }
            }
        }
        None => println!("{from} -> {to}: not connected"),
    }
    Ok(())
}

/// `atrust discover [--as ID | --token T] [--domain D --requestor ID]`
fn cmd_discover(
    ctx: &Ctx,
    as_id: Option<&str>,
    token: Option<&str>,
    domain: Option<&str>,
    requestor: Option<&str>,
    include_revoked: bool,
) -> Result<()> {
    let engine = open_engine(ctx)?;

    let caller = match (as_id, token) {
        (Some(id), _) => Caller::Identity(IdentityId::from(id)),
        (_, Some(t)) => Caller::Credential(t.to_string()),
        _ => Caller::Anonymous,
    };
    let filter = match (domain, requestor) {
        (Some(d), Some(r)) => {
            let mut f = DiscoveryFilter::new(d, IdentityId::from(r));
            f.include_revoked = include_revoked;
            Some(f)
        }
        _ => None,
    };

    let found = engine.discover(&caller, filter.as_ref())?;
    if ctx.json {
        return print_json(&found);
    }
    if found.is_empty() {
        println!("No visible identities");
    }
    for i in &found {
        println!("{:<24} {:<28} {}", i.name, i.id.to_string(), i.scope);
    }
    Ok(())
}

/// `atrust policy show ID`
fn cmd_policy_show(ctx: &Ctx, id: &str) -> Result<()> {
    let engine = open_engine(ctx)?;
    let policies = engine.get_policy(&IdentityId::from(id))?;

    if ctx.json {
        return print_json(&policies);
    }
    if policies.is_empty() {
        println!("No policies attached to {id}");
    }
    for p in &policies {
        println!("Policy {} ({})", p.code, p.statement_id);
        for (i, s) in p.document.statements.iter().enumerate() {
            println!("  [{i}] {:?} {}", s.effect, s.actions.join(", "));
            if let Some(cond) = &s.condition {
                println!("      when {}", serde_json::to_string(cond)?);
            }
        }
    }
    Ok(())
}

/// `atrust policy check ID ACTION [--context k=v]... [--now]`
fn cmd_policy_check(ctx: &Ctx, id: &str, action: &str, context: &[String], now: bool) -> Result<()> {
    let request = parse_context(context, now)?;
    let engine = open_engine(ctx)?;
    let decision = engine.policy_decision(&IdentityId::from(id), action, Some(&request))?;

    if ctx.json {
        return print_json(&serde_json::json!({
            "identity": id,
            "action": action,
            "allowed": decision.allowed,
            "policy": decision.policy_code,
            "statement": decision.statement_index,
        }));
    }
    let verdict = if decision.allowed { "ALLOW" } else { "DENY" };
    println!("{action}: {verdict}");
    if ctx.verbose {
        match (&decision.policy_code, decision.statement_index) {
            (Some(code), Some(i)) => println!("  decided by {code} statement {i}"),
            _ => println!("  no matching statement"),
        }
    }
    Ok(())
}
