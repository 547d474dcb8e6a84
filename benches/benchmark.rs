use churn_predict::record::{
    AddOn, Categorical, Contract, Gender, InternetService, MONTHLY_CHARGES_MAX, MultipleLines,
    PaymentMethod, RawInputRecord, TENURE_MAX, TOTAL_CHARGES_MAX, YesNo,
};
use churn_predict::testing::{
    telco_feature_schema, telco_label_encoders, telco_label_model, telco_one_hot_model,
};
use churn_predict::{ChurnPredictor, FeatureEncoder};
use criterion::{Criterion, criterion_group, criterion_main};
use rand::Rng;
use rand::seq::IndexedRandom;

fn pick<T: Categorical, R: Rng>(rng: &mut R) -> T {
    *T::options().choose(rng).unwrap()
}

fn random_record<R: Rng>(rng: &mut R) -> RawInputRecord {
    RawInputRecord {
        gender: pick::<Gender, _>(rng),
        senior_citizen: rng.random_bool(0.16),
        partner: pick::<YesNo, _>(rng),
        dependents: pick::<YesNo, _>(rng),
        tenure: rng.random_range(0..=TENURE_MAX),
        phone_service: pick::<YesNo, _>(rng),
        multiple_lines: pick::<MultipleLines, _>(rng),
        internet_service: pick::<InternetService, _>(rng),
        online_security: pick::<AddOn, _>(rng),
        online_backup: pick::<AddOn, _>(rng),
        device_protection: pick::<AddOn, _>(rng),
        tech_support: pick::<AddOn, _>(rng),
        streaming_tv: pick::<AddOn, _>(rng),
        streaming_movies: pick::<AddOn, _>(rng),
        contract: pick::<Contract, _>(rng),
        paperless_billing: pick::<YesNo, _>(rng),
        payment_method: pick::<PaymentMethod, _>(rng),
        monthly_charges: rng.random_range(0.0..=MONTHLY_CHARGES_MAX),
        total_charges: rng.random_range(0.0..=TOTAL_CHARGES_MAX),
    }
    .reconciled()
}

fn one_hot_predictor() -> ChurnPredictor {
    ChurnPredictor::new(
        FeatureEncoder::one_hot(telco_feature_schema()),
        telco_one_hot_model(),
        None,
    )
    .unwrap()
}

fn label_predictor() -> ChurnPredictor {
    ChurnPredictor::new(
        FeatureEncoder::label_encoded(telco_label_encoders()).unwrap(),
        telco_label_model(),
        None,
    )
    .unwrap()
}

fn bench_predict_single(c: &mut Criterion) {
    let record = RawInputRecord::default();

    let one_hot = one_hot_predictor();
    c.bench_function("predict one-hot", |b| {
        b.iter(|| {
            let _ = one_hot.predict(&record);
        })
    });

    let label = label_predictor();
    c.bench_function("predict label-encoded", |b| {
        b.iter(|| {
            let _ = label.predict(&record);
        })
    });
}

fn bench_bulk_prediction(c: &mut Criterion) {
    let mut rng = rand::rng();
    let records: Vec<_> = (0..10_000).map(|_| random_record(&mut rng)).collect();
    let predictor = one_hot_predictor();

    c.bench_function("bulk predict 10k customers", |b| {
        b.iter(|| {
            for record in &records {
                let _ = predictor.predict(record);
            }
        });
    });

    c.bench_function("batch predict 10k customers", |b| {
        b.iter(|| {
            let _ = predictor.predict_batch(&records);
        });
    });
}

criterion_group!(benches, bench_predict_single, bench_bulk_prediction);
criterion_main!(benches);
