//! `ssa sessions …` subcommands.

use std::io::Write;

use ssa_domain::config::{Config, StoreBackendKind};
use ssa_sessions::{open_backend, SessionAuthority};

/// Open the authority over the configured backing store.
pub fn open_authority(config: &Config) -> anyhow::Result<SessionAuthority> {
    if config.store.backend == StoreBackendKind::Memory {
        tracing::warn!(
            "store.backend is \"memory\": this process starts with no sessions; \
             point the CLI at a persistent store to inspect a running deployment"
        );
    }
    let backend = open_backend(&config.store)?;
    Ok(SessionAuthority::from_config(&config.authority, backend))
}

pub async fn list(
    authority: &SessionAuthority,
    json: bool,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let sessions = authority.list().await?;

    if json {
        serde_json::to_writer_pretty(&mut *out, &sessions)?;
        writeln!(out)?;
        return Ok(());
    }

    if sessions.is_empty() {
        writeln!(out, "no active sessions")?;
        return Ok(());
    }
    for s in &sessions {
        writeln!(
            out,
            "{}\t{}\t{}\t{}",
            s.user_id,
            s.session_id,
            s.created_at.to_rfc3339(),
            s.ip.as_deref().unwrap_or("-"),
        )?;
    }
    Ok(())
}

pub async fn show(
    authority: &SessionAuthority,
    user_id: &str,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    match authority.current(user_id).await? {
        Some(s) => {
            writeln!(out, "user:       {}", s.user_id)?;
            writeln!(out, "session:    {}", s.session_id)?;
            writeln!(out, "created:    {}", s.created_at.to_rfc3339())?;
            writeln!(out, "ip:         {}", s.ip.as_deref().unwrap_or("-"))?;
            writeln!(out, "user agent: {}", s.user_agent.as_deref().unwrap_or("-"))?;
        }
        None => writeln!(out, "no active session for {user_id}")?,
    }
    Ok(())
}

pub async fn revoke(
    authority: &SessionAuthority,
    user_id: &str,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let had_session = authority.current(user_id).await?.is_some();
    authority.deactivate(user_id).await?;
    if had_session {
        writeln!(out, "revoked session for {user_id}")?;
    } else {
        writeln!(out, "no active session for {user_id}")?;
    }
    Ok(())
}
