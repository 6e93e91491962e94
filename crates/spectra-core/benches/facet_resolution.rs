use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use spectra_core::{
    ActionType, FacetHolder, FacetType, SpecificationLoader, TypeCatalog, TypeDescriptor,
    TypeName,
};

/// A linear chain `dom.T0 <- dom.T1 <- ... <- dom.T{depth-1}`; only the root
/// carries an icon, and every level implements its own empty interface
fn chain(depth: usize) -> SpecificationLoader {
    let catalog = TypeCatalog::new();
    catalog.register(TypeDescriptor::class("dom.T0").annotate("icon", "root"));
    for level in 1..depth {
        let iface = format!("dom.I{level}");
        catalog.register(TypeDescriptor::interface(&iface));
        catalog.register(
            TypeDescriptor::class(&format!("dom.T{level}"))
                .extends(&format!("dom.T{}", level - 1))
                .implements(&iface),
        );
    }
    SpecificationLoader::builder().source(catalog).build()
}

fn bench_inherited_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("inherited_lookup");

    for depth in [2, 8, 32] {
        let loader = chain(depth);
        let leaf = loader
            .load_specification(&TypeName::new(format!("dom.T{}", depth - 1)))
            .unwrap();

        group.bench_with_input(BenchmarkId::new("icon", depth), &leaf, |b, leaf| {
            b.iter(|| leaf.lookup_facet(black_box(FacetType::ICON)));
        });
        group.bench_with_input(BenchmarkId::new("absent", depth), &leaf, |b, leaf| {
            b.iter(|| leaf.lookup_facet(black_box(FacetType::TITLE)));
        });
    }

    group.finish();
}

fn bench_load(c: &mut Criterion) {
    c.bench_function("load_chain_32", |b| {
        b.iter(|| {
            let loader = chain(32);
            loader
                .load_specification(&TypeName::new(black_box("dom.T31")))
                .unwrap()
        });
    });

    let loader = chain(32);
    loader.load_specification(&TypeName::new("dom.T31")).unwrap();
    c.bench_function("load_cached", |b| {
        b.iter(|| {
            loader
                .load_specification(&TypeName::new(black_box("dom.T31")))
                .unwrap()
        });
    });
}

fn bench_is_of_type(c: &mut Criterion) {
    let loader = chain(32);
    let leaf = loader.load_specification(&TypeName::new("dom.T31")).unwrap();
    let root = loader.load_specification(&TypeName::new("dom.T0")).unwrap();

    c.bench_function("is_of_type_depth_32", |b| {
        b.iter(|| black_box(&leaf).is_of_type(black_box(&root)));
    });
}

fn bench_contributions(c: &mut Criterion) {
    let loader = chain(8);
    let leaf = loader.load_specification(&TypeName::new("dom.T7")).unwrap();
    leaf.contributed_actions(&[ActionType::User]).unwrap();

    c.bench_function("contributed_actions_memoized", |b| {
        b.iter(|| leaf.contributed_actions(black_box(&[ActionType::User])).unwrap());
    });
}

criterion_group!(
    benches,
    bench_inherited_lookup,
    bench_load,
    bench_is_of_type,
    bench_contributions
);
criterion_main!(benches);
