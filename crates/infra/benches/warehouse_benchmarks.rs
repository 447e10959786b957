use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use std::sync::Arc;

use chrono::{Duration, Utc};
use fulfilment_core::{BusinessUnitCode, ExpectedVersion};
use fulfilment_events::InMemoryEventBus;
use fulfilment_infra::search::apply_query;
use fulfilment_infra::{
    InMemoryWarehouseStore, PageLimits, SearchQuery, SortBy, SortOrder, Transactor, UnitOfWork,
    WarehouseSearch, WarehouseService, WarehouseStore,
};
use fulfilment_warehouses::{MutationOccurrence, ProposedWarehouse, StaticLocationPolicy, VersionedWarehouse, Warehouse};

const LOCATIONS: [&str; 4] = ["ZWOLLE-001", "AMSTERDAM-001", "VETSBY-001", "EINDHOVEN-001"];

fn code(i: usize) -> BusinessUnitCode {
    BusinessUnitCode::parse(format!("BENCH-{i:06}")).unwrap()
}

fn warehouse(i: usize) -> Warehouse {
    Warehouse {
        business_unit_code: code(i),
        location: LOCATIONS[i % LOCATIONS.len()].to_string(),
        capacity: (i % 40) as i64,
        stock: 0,
        created_at: Utc::now() + Duration::seconds(i as i64),
        archived_at: None,
    }
}

fn seeded_store(records: usize) -> Arc<InMemoryWarehouseStore> {
    let store = InMemoryWarehouseStore::arc();
    let mut uow = UnitOfWork::begin();
    for i in 0..records {
        store.create(&mut uow, warehouse(i)).unwrap();
    }
    uow.commit();
    store
}

fn bench_versioned_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("versioned_update");
    group.throughput(Throughput::Elements(1));

    let store = seeded_store(1_000);
    let mut versions = vec![1u64; 1_000];
    let mut next = 0usize;

    group.bench_function("store_update_and_commit", |b| {
        b.iter(|| {
            let i = next % versions.len();
            next += 1;
            let mut uow = UnitOfWork::begin();
            let stored = store
                .versioned_update(&mut uow, &code(i), ExpectedVersion::Exact(versions[i]), &mut |w| {
                    w.stock = (w.stock + 1) % (w.capacity + 1);
                })
                .unwrap();
            versions[i] = stored.version;
            black_box(uow.commit());
        })
    });

    let bus: Arc<InMemoryEventBus<MutationOccurrence>> = Arc::new(InMemoryEventBus::new());
    let service = WarehouseService::new(
        seeded_store(1_000),
        StaticLocationPolicy::default_catalogue(),
        Transactor::new(bus),
    );
    let mut next = 0usize;

    group.bench_function("service_replace", |b| {
        b.iter(|| {
            let i = next % 1_000;
            next += 1;
            let proposed = ProposedWarehouse::new(
                code(i),
                LOCATIONS[i % LOCATIONS.len()],
                Some(40),
                Some((next % 40) as i64),
            );
            black_box(service.replace(proposed).unwrap());
        })
    });

    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");

    for size in [1_000usize, 10_000, 50_000].iter() {
        group.throughput(Throughput::Elements(*size as u64));

        let records: Vec<VersionedWarehouse> = (0..*size)
            .map(|i| VersionedWarehouse::new(warehouse(i), 1))
            .collect();
        let query = SearchQuery::new()
            .min_capacity(10)
            .max_capacity(30)
            .sort(SortBy::Capacity, SortOrder::Desc)
            .page(3, 25);
        let limits = PageLimits::default();

        group.bench_with_input(BenchmarkId::new("apply_query", size), size, |b, _| {
            b.iter(|| black_box(apply_query(records.iter().cloned(), &query, &limits).unwrap()))
        });

        let search = WarehouseSearch::new(seeded_store(*size), limits);
        group.bench_with_input(BenchmarkId::new("store_search", size), size, |b, _| {
            b.iter(|| black_box(search.search(&query).unwrap()))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_versioned_update, bench_search);
criterion_main!(benches);
