// Signing & verification benchmarks for the VERITAS protocol.
//
// Covers key derivation, signing under a registry nonce, the pure equation
// check, full verification (equation + nonce consumption), credential
// hashing, and raw registry throughput.

use std::sync::Arc;

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};

use veritas_protocol::attestation::Authority;
use veritas_protocol::crypto::curve::derive_public_key;
use veritas_protocol::crypto::signatures::verify_equation;
use veritas_protocol::identity::{hash_credential_subject, CredentialSubject};
use veritas_protocol::nonce::{NonceContext, NonceRegistry};

const SK: [u8; 32] = [0x11; 32];
const MESSAGE: &[u8] = b"attest: subject 0001, nonce-bound";

fn bench_derive_public_key(c: &mut Criterion) {
    c.bench_function("bn254/derive_public_key", |b| {
        b.iter(|| derive_public_key(&SK));
    });
}

fn bench_sign(c: &mut Criterion) {
    let authority = Authority::standalone(NonceContext::default());

    c.bench_function("schnorr/sign", |b| {
        b.iter(|| authority.sign(MESSAGE, &SK));
    });
}

fn bench_check_equation(c: &mut Criterion) {
    let authority = Authority::standalone(NonceContext::default());
    let Ok(signature) = authority.sign(MESSAGE, &SK) else {
        return;
    };

    c.bench_function("schnorr/check_equation", |b| {
        b.iter(|| verify_equation(MESSAGE, &signature));
    });
}

fn bench_verify_and_consume(c: &mut Criterion) {
    let authority = Authority::standalone(NonceContext::default());

    // Every verification consumes a nonce, so each iteration needs a fresh
    // signature. Signing happens in the setup closure and isn't timed.
    c.bench_function("schnorr/verify_and_consume", |b| {
        b.iter_batched(
            || authority.sign(MESSAGE, &SK),
            |signature| signature.map(|sig| authority.verify(MESSAGE, &sig)),
            BatchSize::SmallInput,
        );
    });
}

fn bench_hash_credential(c: &mut Criterion) {
    let subject = CredentialSubject::new(
        CredentialSubject::new_id(),
        "Ada",
        "Lovelace",
        [0x42; 32],
        631_152_000,
    );

    c.bench_function("credential/hash", |b| {
        b.iter(|| hash_credential_subject(&subject));
    });
}

fn bench_registry_issue_consume(c: &mut Criterion) {
    let registry = Arc::new(NonceRegistry::new());
    let ctx = NonceContext::default();

    c.bench_function("registry/issue_consume", |b| {
        b.iter(|| {
            let n = registry.issue(&ctx);
            registry.try_consume(&ctx, n)
        });
    });
}

criterion_group!(
    benches,
    bench_derive_public_key,
    bench_sign,
    bench_check_equation,
    bench_verify_and_consume,
    bench_hash_credential,
    bench_registry_issue_consume,
);
criterion_main!(benches);
