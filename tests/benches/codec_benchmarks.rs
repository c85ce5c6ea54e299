//! # Hats Modules Client Benchmarks
//!
//! | Area | Operation |
//! |------|-----------|
//! | Registry | index build over the fixture document |
//! | Marshalling | JSON args to ABI values, packed and head/tail encoding |
//! | Factory | `createHatsModule` calldata, instance address prediction |
//! | Reverts | custom error decoding |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use hats_modules_client::domain::codec;
use hats_modules_client::domain::factory::{create_module_calldata, ModuleDeployment};
use hats_modules_client::domain::marshal::{marshal_args, ArgSpec};
use hats_modules_client::domain::services::function_selector;
use hats_modules_client::prelude::*;
use hats_modules_tests::fixtures::{addr, registry, ALLOWLIST, FACTORY, OWNER_HAT, TEST_CHAIN};
use serde_json::json;

fn bench_registry_index(c: &mut Criterion) {
    let document = registry();
    c.bench_function("registry_index_build", |b| {
        b.iter(|| RegistryIndex::new(black_box(document.clone())).unwrap())
    });

    let index = RegistryIndex::new(document).unwrap();
    c.bench_function("registry_lookup_by_id", |b| {
        b.iter(|| index.module_by_id(black_box(ALLOWLIST)).unwrap().name.len())
    });
}

fn bench_marshalling(c: &mut Criterion) {
    let mut group = c.benchmark_group("marshal");
    let spec = [ArgSpec::parse("Accounts", "address[]").unwrap()];

    for size in [1usize, 16, 128] {
        let accounts: Vec<_> = (0..size)
            .map(|i| json!(format!("0x{:040x}", i + 1)))
            .collect();
        let args = [serde_json::Value::Array(accounts)];

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("address_array_encode", size), &args, |b, args| {
            b.iter(|| {
                let values = marshal_args("bench", &spec, black_box(args)).unwrap();
                codec::encode(&values)
            })
        });
    }

    let hat_specs = [
        ArgSpec::parse("Owner Hat", "uint256").unwrap(),
        ArgSpec::parse("Arbitrator Hat", "uint256").unwrap(),
    ];
    let values = marshal_args("bench", &hat_specs, &[json!(OWNER_HAT), json!(7)]).unwrap();
    group.bench_function("packed_immutable_args", |b| {
        b.iter(|| codec::encode_packed(black_box(&values)).unwrap())
    });
    group.finish();
}

fn bench_factory(c: &mut Criterion) {
    let deployment = ModuleDeployment {
        implementation: addr(ALLOWLIST),
        hat_id: U256::from(42),
        other_immutable_args: vec![0xab; 64],
        init_data: vec![0xcd; 96],
    };
    c.bench_function("create_module_calldata", |b| {
        b.iter(|| create_module_calldata(black_box(&deployment)))
    });

    c.bench_function("predict_instance_address", |b| {
        b.iter(|| {
            predict_instance_address(
                addr(FACTORY),
                addr(ALLOWLIST),
                black_box(U256::from(42)),
                &deployment.other_immutable_args,
                ChainId(TEST_CHAIN),
            )
        })
    });
}

fn bench_revert_decoding(c: &mut Criterion) {
    let allowlist = registry()
        .modules
        .into_iter()
        .find(|m| m.implementation_address == addr(ALLOWLIST))
        .unwrap();
    let data = function_selector("AllowlistEligibility_NotOwner()").to_vec();

    c.bench_function("decode_custom_error", |b| {
        b.iter(|| decode_revert(black_box(&data), &allowlist.abi).to_string())
    });
}

criterion_group!(
    benches,
    bench_registry_index,
    bench_marshalling,
    bench_factory,
    bench_revert_decoding
);
criterion_main!(benches);
