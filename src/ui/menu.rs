//! Interactive top-level menu.
//!
//! Each entry collects its inputs, runs one workflow, and reports the
//! outcome. Workflow errors are printed and the menu is shown again; only an
//! unavailable engine or closed input ends the loop.

use crate::cert::ca::create_root_ca;
use crate::cert::chain::regenerate_chain;
use crate::cert::client::{self, create_client_cert, recorded_issuer};
use crate::cert::inspect::{inspect_candidates, inspect_object};
use crate::cert::intermediate::{self, create_intermediate_ca};
use crate::cert::issue::IssueRequest;
use crate::cert::subject::{parse_validity_days, Subject};
use crate::config::{
    DEFAULT_CLIENT_VALIDITY_DAYS, DEFAULT_INTERMEDIATE_VALIDITY_DAYS, DEFAULT_ROOT_VALIDITY_DAYS,
};
use crate::engine::SigningEngine;
use crate::error::Result;
use crate::storage::layout::{CertStore, EntityKind, ObjectType};
use crate::ui::prompt::{is_end_of_input, Prompt};
use crate::ui::selector::{choose, parse_choice, select_index};
use tracing::warn;

const MAIN_MENU: &[&str] = &[
    "1) Create / overwrite root CA",
    "2) Create intermediate CA",
    "3) Create client certificate",
    "4) Exit",
    "5) More operations",
];

const MORE_MENU: &[&str] = &[
    "1) Regenerate certificate chain",
    "2) Inspect CSR or certificate",
    "3) Back",
];

/// Run the menu until the operator exits or input ends.
///
/// Returns `Err` only for fatal errors.
pub fn run_menu(store: &CertStore, engine: &dyn SigningEngine, prompt: &mut dyn Prompt) -> Result<()> {
    loop {
        prompt.say("")?;
        prompt.say(&format!("== PQ PKI ({}) ==", engine.algorithm()))?;
        for line in MAIN_MENU {
            prompt.say(line)?;
        }

        let outcome = match prompt.ask("Choice: ") {
            Ok(answer) => match parse_choice(&answer, MAIN_MENU.len()) {
                Ok(0) => handle_create_root(store, engine, prompt),
                Ok(1) => handle_create_intermediate(store, engine, prompt),
                Ok(2) => handle_create_client(store, engine, prompt),
                Ok(3) => return Ok(()),
                Ok(_) => handle_more(store, engine, prompt),
                Err(e) => Err(e),
            },
            Err(e) => Err(e),
        };

        if let Err(e) = outcome {
            if is_end_of_input(&e) {
                return Ok(());
            }
            // The engine went away mid-session.
            if e.is_fatal() {
                return Err(e);
            }
            warn!(error = %e, "operation failed");
            prompt.say(&format!("Error: {}", e))?;
        }
    }
}

fn handle_more(store: &CertStore, engine: &dyn SigningEngine, prompt: &mut dyn Prompt) -> Result<()> {
    for line in MORE_MENU {
        prompt.say(line)?;
    }
    match parse_choice(&prompt.ask("Choice: ")?, MORE_MENU.len())? {
        0 => handle_regenerate_chain(store, prompt),
        1 => handle_inspect(store, engine, prompt),
        _ => Ok(()),
    }
}

fn ask_request(prompt: &mut dyn Prompt, default_days: u32) -> Result<IssueRequest> {
    let common_name = prompt.ask("Common name (CN): ")?;
    let organization = prompt.ask("Organization (O, optional): ")?;
    let subject = Subject::new(&common_name, &organization)?;

    let days = prompt.ask(&format!("Validity in days [{}]: ", default_days))?;
    let validity_days = parse_validity_days(&days, default_days)?;

    Ok(IssueRequest {
        subject,
        validity_days,
    })
}

fn handle_create_root(
    store: &CertStore,
    engine: &dyn SigningEngine,
    prompt: &mut dyn Prompt,
) -> Result<()> {
    if store.has_root() {
        let answer = prompt.ask("A root CA already exists. Overwrite it? [y/N]: ")?;
        if !matches!(answer.trim(), "y" | "Y" | "yes") {
            prompt.say("Root CA left unchanged.")?;
            return Ok(());
        }
    }

    let request = ask_request(prompt, DEFAULT_ROOT_VALIDITY_DAYS)?;
    create_root_ca(store, engine, &request)?;

    prompt.say(&format!(
        "✓ Root CA created: {}",
        store.root_cert_path().display()
    ))?;
    prompt.say(&format!("  Subject: CN={}", request.subject.common_name))?;
    prompt.say(&format!("  Valid for: {} days", request.validity_days))?;
    Ok(())
}

fn handle_create_intermediate(
    store: &CertStore,
    engine: &dyn SigningEngine,
    prompt: &mut dyn Prompt,
) -> Result<()> {
    intermediate::ensure_prerequisites(store)?;

    let request = ask_request(prompt, DEFAULT_INTERMEDIATE_VALIDITY_DAYS)?;
    let handle = create_intermediate_ca(store, engine, &request)?;

    prompt.say(&format!("✓ Intermediate CA created: {}", handle.dir().display()))?;
    prompt.say("  Signed by: root CA")?;
    prompt.say(&format!("  Chain: {}", handle.chain_path().display()))?;
    Ok(())
}

fn handle_create_client(
    store: &CertStore,
    engine: &dyn SigningEngine,
    prompt: &mut dyn Prompt,
) -> Result<()> {
    client::ensure_prerequisites(store)?;

    let issuer = choose(prompt, store, EntityKind::Intermediate)?;
    let request = ask_request(prompt, DEFAULT_CLIENT_VALIDITY_DAYS)?;
    let handle = create_client_cert(store, engine, &issuer, &request)?;

    prompt.say(&format!("✓ Client certificate created: {}", handle.dir().display()))?;
    prompt.say(&format!("  Signed by: {}", issuer))?;
    prompt.say(&format!("  Chain: {}", handle.chain_path().display()))?;
    Ok(())
}

fn handle_regenerate_chain(store: &CertStore, prompt: &mut dyn Prompt) -> Result<()> {
    let kinds = [EntityKind::Intermediate, EntityKind::Client];
    let labels: Vec<String> = kinds.iter().map(|k| k.to_string()).collect();
    let kind = kinds[select_index(prompt, "entity kinds", &labels)?];

    let entity = choose(prompt, store, kind)?;
    let issuer = match kind {
        EntityKind::Intermediate => None,
        EntityKind::Client => match recorded_issuer(store, &entity)? {
            Some(issuer) => Some(issuer),
            None => {
                prompt.say(&format!("No issuer recorded for {}.", entity))?;
                Some(choose(prompt, store, EntityKind::Intermediate)?)
            }
        },
    };

    let output_name = prompt.ask("Output file name: ")?;
    let written = regenerate_chain(store, &entity, issuer.as_ref(), &output_name)?;

    prompt.say(&format!("✓ Chain written: {}", written.display()))?;
    Ok(())
}

fn handle_inspect(store: &CertStore, engine: &dyn SigningEngine, prompt: &mut dyn Prompt) -> Result<()> {
    let types = [ObjectType::Csr, ObjectType::Certificate];
    let type_labels = vec!["CSR".to_string(), "Certificate".to_string()];
    let object = types[select_index(prompt, "object types", &type_labels)?];

    let candidates = inspect_candidates(store, object)?;
    let labels: Vec<String> = candidates
        .iter()
        .map(|p| p.display().to_string())
        .collect();
    let what = match object {
        ObjectType::Csr => "CSRs",
        ObjectType::Certificate => "certificates",
    };
    let index = select_index(prompt, what, &labels)?;

    let text = inspect_object(store, engine, object, &candidates[index])?;
    for line in text.lines() {
        prompt.say(line)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testing::FakeEngine;
    use crate::engine::{CsrRequest, SelfSignedRequest, SignRequest};
    use crate::error::PqPkiError;
    use crate::ui::prompt::TextPrompt;
    use std::fs;
    use std::io::Cursor;
    use std::path::Path;
    use tempfile::TempDir;

    /// Engine whose program disappeared after start-up.
    struct LostEngine;

    impl LostEngine {
        fn gone() -> Result<()> {
            Err(PqPkiError::EngineUnavailable("docker: not found".to_string()))
        }
    }

    impl SigningEngine for LostEngine {
        fn algorithm(&self) -> &str {
            "lost"
        }

        fn ensure_available(&self) -> Result<()> {
            Ok(())
        }

        fn issue_self_signed(&self, _request: &SelfSignedRequest) -> Result<()> {
            Self::gone()
        }

        fn generate_csr(&self, _request: &CsrRequest) -> Result<()> {
            Self::gone()
        }

        fn sign_csr(&self, _request: &SignRequest) -> Result<()> {
            Self::gone()
        }

        fn decode(&self, _object: ObjectType, _path: &Path) -> Result<String> {
            Self::gone().map(|_| String::new())
        }
    }

    fn run(store: &CertStore, engine: &FakeEngine, script: &str) -> String {
        let mut prompt = TextPrompt::new(Cursor::new(script.to_string()), Vec::new());
        run_menu(store, engine, &mut prompt).unwrap();
        String::from_utf8(prompt.into_output()).unwrap()
    }

    #[test]
    fn test_exit_choice() {
        let temp_dir = TempDir::new().unwrap();
        let store = CertStore::new(temp_dir.path());
        let engine = FakeEngine::new(temp_dir.path());

        let output = run(&store, &engine, "4\n");
        assert!(output.contains("1) Create / overwrite root CA"));
        assert!(engine.calls.borrow().is_empty());
    }

    #[test]
    fn test_end_of_input_exits() {
        let temp_dir = TempDir::new().unwrap();
        let store = CertStore::new(temp_dir.path());
        let engine = FakeEngine::new(temp_dir.path());

        run(&store, &engine, "");
    }

    #[test]
    fn test_errors_return_to_menu() {
        let temp_dir = TempDir::new().unwrap();
        let store = CertStore::new(temp_dir.path());
        let engine = FakeEngine::new(temp_dir.path());

        let output = run(&store, &engine, "9\n2\n3\n4\n");

        assert!(output.contains("Error: Invalid selection: 9 is out of range 1-5"));
        assert!(output.contains("Error: Prerequisite missing: no root CA exists"));
        assert!(output.contains("Error: Prerequisite missing: no intermediate CA exists"));
        assert!(!temp_dir.path().join("intermediates").exists());
    }

    #[test]
    fn test_create_root_from_menu() {
        let temp_dir = TempDir::new().unwrap();
        let store = CertStore::new(temp_dir.path());
        let engine = FakeEngine::new(temp_dir.path());

        let output = run(&store, &engine, "1\nAcme Root\nAcme\n\n4\n");

        assert!(store.has_root());
        assert!(output.contains("✓ Root CA created"));
        assert!(output.contains("Valid for: 3650 days"));
    }

    #[test]
    fn test_overwrite_root_declined() {
        let temp_dir = TempDir::new().unwrap();
        let store = CertStore::new(temp_dir.path());
        let engine = FakeEngine::new(temp_dir.path());
        run(&store, &engine, "1\nRoot A\n\n\n4\n");
        let before = fs::read(store.resolve(store.root_cert_path())).unwrap();

        let output = run(&store, &engine, "1\nn\n4\n");

        assert!(output.contains("Root CA left unchanged."));
        assert_eq!(fs::read(store.resolve(store.root_cert_path())).unwrap(), before);
    }

    #[test]
    fn test_bad_validity_reported() {
        let temp_dir = TempDir::new().unwrap();
        let store = CertStore::new(temp_dir.path());
        let engine = FakeEngine::new(temp_dir.path());

        let output = run(&store, &engine, "1\nRoot\n\nforever\n4\n");

        assert!(output.contains("Error: Invalid input"));
        assert!(!store.has_root());
        assert!(engine.calls.borrow().is_empty());
    }

    #[test]
    fn test_more_menu_back() {
        let temp_dir = TempDir::new().unwrap();
        let store = CertStore::new(temp_dir.path());
        let engine = FakeEngine::new(temp_dir.path());

        let output = run(&store, &engine, "5\n3\n4\n");
        assert!(output.contains("1) Regenerate certificate chain"));
    }

    #[test]
    fn test_unavailable_engine_ends_menu() {
        let temp_dir = TempDir::new().unwrap();
        let store = CertStore::new(temp_dir.path());
        let mut prompt = TextPrompt::new(Cursor::new("1\nRoot\n\n\n4\n"), Vec::new());

        let result = run_menu(&store, &LostEngine, &mut prompt);

        assert!(matches!(result, Err(PqPkiError::EngineUnavailable(_))));
        assert!(!store.has_root());
        let output = String::from_utf8(prompt.into_output()).unwrap();
        assert!(!output.contains("Error:"));
    }

    #[test]
    fn test_regenerate_client_without_recorded_issuer() {
        let temp_dir = TempDir::new().unwrap();
        let store = CertStore::new(temp_dir.path());
        let engine = FakeEngine::new(temp_dir.path());
        let request = |cn: &str| IssueRequest {
            subject: Subject::new(cn, "").unwrap(),
            validity_days: 30,
        };
        create_root_ca(&store, &engine, &request("Root")).unwrap();
        let inter = create_intermediate_ca(&store, &engine, &request("Issuing")).unwrap();
        let client = create_client_cert(&store, &engine, &inter, &request("svc1")).unwrap();
        fs::remove_file(store.resolve(client.dir().join("entity.json"))).unwrap();

        // more, regenerate, kind client, first client, first intermediate, name
        let output = run(&store, &engine, "5\n1\n2\n1\n1\nchain.pem\n4\n");

        assert!(output.contains(&format!("No issuer recorded for {}.", client)));
        assert!(output.contains("Available intermediates:"));
        assert!(!output.contains("Error:"), "{}", output);
        assert_eq!(
            fs::read(store.resolve(client.dir().join("chain.pem"))).unwrap(),
            fs::read(store.resolve(client.chain_path())).unwrap()
        );
    }
}
