//! OpenSSL argument vectors for each engine operation.
//!
//! These are pure functions so the exact command lines can be tested
//! without an OpenSSL binary.

use crate::cert::subject::Subject;
use crate::engine::{CertProfile, CsrRequest, SelfSignedRequest, SignRequest};
use crate::storage::ObjectType;
use std::path::Path;

/// Render a subject in `-subj` syntax, e.g. `/CN=svc1/O=Acme`.
///
/// `\`, `/` and `+` inside values are backslash-escaped.
///
/// # Example
///
/// ```
/// use pqpki::cert::subject::Subject;
/// use pqpki::engine::openssl::subject_arg;
///
/// let subject = Subject::new("a/b", "Acme").unwrap();
/// assert_eq!(subject_arg(&subject), "/CN=a\\/b/O=Acme");
/// ```
pub fn subject_arg(subject: &Subject) -> String {
    let mut out = format!("/CN={}", escape_value(&subject.common_name));
    if let Some(org) = &subject.organization {
        out.push_str("/O=");
        out.push_str(&escape_value(org));
    }
    out
}

fn escape_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '/' | '+') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// X.509v3 extensions requested for a profile, as `-addext` values.
pub fn profile_extensions(profile: CertProfile) -> &'static [&'static str] {
    match profile {
        CertProfile::RootCa => &[
            "basicConstraints=critical,CA:TRUE",
            "keyUsage=critical,keyCertSign,cRLSign",
        ],
        CertProfile::IntermediateCa => &[
            "basicConstraints=critical,CA:TRUE,pathlen:0",
            "keyUsage=critical,keyCertSign,cRLSign",
        ],
        CertProfile::Client => &[
            "basicConstraints=critical,CA:FALSE",
            "keyUsage=critical,digitalSignature",
            "extendedKeyUsage=serverAuth,clientAuth",
        ],
    }
}

fn path_arg(path: &Path) -> String {
    // Container paths are POSIX regardless of the host.
    path.to_string_lossy().replace('\\', "/")
}

fn push_extensions(args: &mut Vec<String>, profile: CertProfile) {
    for ext in profile_extensions(profile) {
        args.push("-addext".to_string());
        args.push((*ext).to_string());
    }
}

/// `req -x509` arguments for a self-signed root.
pub fn self_signed_args(algorithm: &str, request: &SelfSignedRequest) -> Vec<String> {
    let mut args: Vec<String> = vec![
        "req".into(),
        "-x509".into(),
        "-new".into(),
        "-newkey".into(),
        algorithm.into(),
        "-keyout".into(),
        path_arg(&request.key_out),
        "-out".into(),
        path_arg(&request.cert_out),
        "-nodes".into(),
        "-subj".into(),
        subject_arg(&request.subject),
        "-days".into(),
        request.validity_days.to_string(),
    ];
    push_extensions(&mut args, CertProfile::RootCa);
    args
}

/// `req -new` arguments for a key and CSR.
pub fn csr_args(algorithm: &str, request: &CsrRequest) -> Vec<String> {
    let mut args: Vec<String> = vec![
        "req".into(),
        "-new".into(),
        "-newkey".into(),
        algorithm.into(),
        "-keyout".into(),
        path_arg(&request.key_out),
        "-out".into(),
        path_arg(&request.csr_out),
        "-nodes".into(),
        "-subj".into(),
        subject_arg(&request.subject),
    ];
    push_extensions(&mut args, request.profile);
    args
}

/// `x509 -req` arguments for signing a CSR.
///
/// Extensions requested in the CSR are copied into the certificate.
pub fn sign_args(request: &SignRequest) -> Vec<String> {
    vec![
        "x509".into(),
        "-req".into(),
        "-in".into(),
        path_arg(&request.csr_in),
        "-out".into(),
        path_arg(&request.cert_out),
        "-CA".into(),
        path_arg(&request.issuer_cert),
        "-CAkey".into(),
        path_arg(&request.issuer_key),
        "-CAcreateserial".into(),
        "-days".into(),
        request.validity_days.to_string(),
        "-copy_extensions".into(),
        "copyall".into(),
    ]
}

/// Text dump arguments for a CSR or certificate.
pub fn decode_args(object: ObjectType, path: &Path) -> Vec<String> {
    let command = match object {
        ObjectType::Csr => "req",
        ObjectType::Certificate => "x509",
    };
    vec![
        command.into(),
        "-in".into(),
        path_arg(path),
        "-noout".into(),
        "-text".into(),
    ]
}
