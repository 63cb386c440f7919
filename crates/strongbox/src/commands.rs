// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Subcommand bodies. Each writes its result to `out`; prompts and
//! diagnostics go to stderr.

use std::io::Write;

use secrecy::{ExposeSecret, SecretString};
use strongbox_core::StrongboxError;
use strongbox_vault::{StoreOutcome, Vault};

fn write_out(out: &mut impl Write, line: &str) -> Result<(), StrongboxError> {
    writeln!(out, "{line}").map_err(|e| StrongboxError::Internal(format!("cannot write output: {e}")))
}

/// `strongbox generate`: print the new password.
pub async fn generate(
    vault: &Vault,
    service: &str,
    out: &mut impl Write,
) -> Result<(), StrongboxError> {
    let secret = vault.generate_and_store(service).await?;
    write_out(out, secret.password.expose_secret())?;
    eprintln!("Stored version {} of `{service}`.", secret.version);
    Ok(())
}

/// `strongbox set`: store an operator-supplied password.
pub async fn set(
    vault: &Vault,
    service: &str,
    password: &SecretString,
    out: &mut impl Write,
) -> Result<(), StrongboxError> {
    match vault.store_existing(service, password).await? {
        StoreOutcome::Stored { version } => {
            write_out(out, &format!("Stored version {version} of `{service}`."))
        }
        StoreOutcome::Failed { reason } => Err(StrongboxError::BackendUnavailable {
            message: format!("password for `{service}` was not stored: {reason}"),
            source: None,
        }),
    }
}

/// `strongbox get`: print the current or a specific version.
pub async fn get(
    vault: &Vault,
    service: &str,
    version: Option<u64>,
    out: &mut impl Write,
) -> Result<(), StrongboxError> {
    let secret = match version {
        Some(v) => vault.retrieve_version(service, v).await?,
        None => vault.retrieve_current(service).await?,
    };
    write_out(out, secret.expose_secret())
}

/// `strongbox history`: newest-first version table, current marked with `*`.
pub async fn history(
    vault: &Vault,
    service: &str,
    out: &mut impl Write,
) -> Result<(), StrongboxError> {
    let entries = vault.list_versions(service).await?;
    if entries.is_empty() {
        return Err(StrongboxError::not_found(service, "history"));
    }

    let current = match vault.current_version(service).await {
        Ok(v) => Some(v),
        Err(e) if e.is_not_found() => None,
        Err(e) => return Err(e),
    };

    write_out(out, "  VERSION  CREATED")?;
    for entry in entries {
        let marker = if Some(entry.version) == current { '*' } else { ' ' };
        let created = entry.timestamp.as_deref().unwrap_or("-");
        write_out(out, &format!("{marker} {:>7}  {created}", entry.version))?;
    }
    Ok(())
}

/// `strongbox rollback`: repoint current at an older version.
pub async fn rollback(
    vault: &Vault,
    service: &str,
    version: u64,
    out: &mut impl Write,
) -> Result<(), StrongboxError> {
    vault.rollback(service, version).await?;
    write_out(out, &format!("`{service}` now points at version {version}."))
}

/// `strongbox services`: one service per line.
pub async fn services(vault: &Vault, out: &mut impl Write) -> Result<(), StrongboxError> {
    for service in vault.list_services().await? {
        write_out(out, &service)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use strongbox_test_utils::MockKvStore;
    use strongbox_vault::{GeneratorOptions, PasswordGenerator};

    fn vault(store: &MockKvStore) -> Vault {
        let generator = PasswordGenerator::new(&GeneratorOptions::default()).unwrap();
        Vault::new(Arc::new(store.clone()), generator)
            .with_master_key(&SecretString::from("cli-test-key"))
            .unwrap()
    }

    fn output(buf: Vec<u8>) -> String {
        String::from_utf8(buf).unwrap()
    }

    #[tokio::test]
    async fn generate_then_get_prints_same_password() {
        let store = MockKvStore::new();
        let vault = vault(&store);

        let mut generated = Vec::<u8>::new();
        generate(&vault, "db", &mut generated).await.unwrap();
        let mut fetched = Vec::<u8>::new();
        get(&vault, "db", None, &mut fetched).await.unwrap();

        let generated = output(generated);
        assert_eq!(generated.trim_end().chars().count(), 12);
        assert_eq!(generated, output(fetched));
    }

    #[tokio::test]
    async fn history_marks_current_version() {
        let store = MockKvStore::new();
        let vault = vault(&store);
        let mut sink = Vec::<u8>::new();
        set(&vault, "db", &SecretString::from("one"), &mut sink).await.unwrap();
        set(&vault, "db", &SecretString::from("two"), &mut sink).await.unwrap();
        rollback(&vault, "db", 1, &mut sink).await.unwrap();

        let mut table = Vec::<u8>::new();
        history(&vault, "db", &mut table).await.unwrap();
        let table = output(table);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("        2"), "got {:?}", lines[1]);
        assert!(lines[2].starts_with("*       1"), "got {:?}", lines[2]);
    }

    #[tokio::test]
    async fn history_of_unknown_service_is_not_found() {
        let store = MockKvStore::new();
        let err = history(&vault(&store), "ghost", &mut Vec::<u8>::new())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn set_reports_backend_failure() {
        let store = MockKvStore::new();
        let vault = vault(&store);
        store.fail_nth_put(1).await;
        let err = set(&vault, "db", &SecretString::from("pw"), &mut Vec::<u8>::new())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("was not stored"));
    }

    #[tokio::test]
    async fn get_specific_version() {
        let store = MockKvStore::new();
        let vault = vault(&store);
        let mut sink = Vec::<u8>::new();
        set(&vault, "db", &SecretString::from("first"), &mut sink).await.unwrap();
        set(&vault, "db", &SecretString::from("second"), &mut sink).await.unwrap();

        let mut out = Vec::<u8>::new();
        get(&vault, "db", Some(1), &mut out).await.unwrap();
        assert_eq!(output(out), "first\n");
    }

    #[tokio::test]
    async fn services_lists_one_per_line() {
        let store = MockKvStore::new();
        let vault = vault(&store);
        let mut sink = Vec::<u8>::new();
        set(&vault, "web", &SecretString::from("a"), &mut sink).await.unwrap();
        set(&vault, "db", &SecretString::from("b"), &mut sink).await.unwrap();

        let mut out = Vec::<u8>::new();
        services(&vault, &mut out).await.unwrap();
        assert_eq!(output(out), "db\nweb\n");
    }
}
