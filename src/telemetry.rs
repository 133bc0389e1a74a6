//! Observabilidade: tracing + OpenTelemetry (OTLP/HTTP), spans por operação,
//! histogramas de latência e de crescimento do invariante.
//!
//! Sem `init`, o meter global é no-op: biblioteca e testes não pagam nada.
//! Chame `init` antes da primeira operação para que os instrumentos nasçam
//! ligados ao provider real.

use anyhow::Result;
use once_cell::sync::OnceCell;
use std::time::{Duration, Instant};

use opentelemetry::{
    global,
    metrics::{Histogram, MeterProvider as _},
    trace::TracerProvider as _,
    KeyValue,
};
use opentelemetry_otlp::{MetricExporter, SpanExporter, WithExportConfig};
use opentelemetry_sdk::{
    metrics::{PeriodicReader, SdkMeterProvider},
    resource::Resource,
    trace::SdkTracerProvider,
};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter, Registry};

use crate::amm::guardrails::mul_wide;
use crate::amm::types::{Direction, PoolSnapshot, U512};

pub const SERVICE_NAME: &str = "dex-core";
const METER_NAME: &str = "dex_core";
const PPB: u64 = 1_000_000_000;

static OP_DURATION: OnceCell<Histogram<f64>> = OnceCell::new();
static INVARIANT_GROWTH: OnceCell<Histogram<u64>> = OnceCell::new();

pub struct Telemetry {
    pub tracer_provider: SdkTracerProvider,
    pub meter_provider: SdkMeterProvider,
}

impl Telemetry {
    pub fn shutdown(&self) {
        let _ = self.meter_provider.force_flush();
        let _ = self.tracer_provider.shutdown();
        let _ = self.meter_provider.shutdown();
    }
}

fn commit_sha() -> String {
    std::env::var("DEX_COMMIT_SHA").unwrap_or_else(|_| "unknown".into())
}

pub fn filter_from_env() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Só logs no terminal (sem exportadores OTLP).
pub fn init_logging() -> Result<()> {
    let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);
    let subscriber = Registry::default().with(filter_from_env()).with(fmt_layer);
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

pub fn init(service_name: &str) -> Result<Telemetry> {
    let endpoint = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
        .unwrap_or_else(|_| "http://localhost:4318".to_string());

    let resource = Resource::builder()
        .with_attributes([
            KeyValue::new("service.name", service_name.to_string()),
            KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
            KeyValue::new("git.commit.sha", commit_sha()),
        ])
        .build();

    // ---- Traces (OTLP/HTTP) ----
    let span_exporter = SpanExporter::builder()
        .with_http()
        .with_endpoint(format!("{}/v1/traces", endpoint))
        .build()?;

    let tracer_provider = SdkTracerProvider::builder()
        .with_resource(resource.clone())
        .with_batch_exporter(span_exporter)
        .build();

    let tracer = tracer_provider.tracer(METER_NAME);

    // ---- Métricas (OTLP/HTTP) ----
    let metric_exporter = MetricExporter::builder()
        .with_http()
        .with_endpoint(format!("{}/v1/metrics", endpoint))
        .build()?;

    let reader = PeriodicReader::builder(metric_exporter)
        .with_interval(Duration::from_secs(10))
        .build();

    let meter_provider = SdkMeterProvider::builder()
        .with_resource(resource)
        .with_reader(reader)
        .build();

    // Globais
    global::set_tracer_provider(tracer_provider.clone());
    global::set_meter_provider(meter_provider.clone());

    // tracing -> OTel
    let otel_layer = tracing_opentelemetry::layer().with_tracer(tracer);
    let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);
    let subscriber = Registry::default()
        .with(filter_from_env())
        .with(fmt_layer)
        .with(otel_layer);
    tracing::subscriber::set_global_default(subscriber)?;

    // instrumentos já nascem no provider real
    let meter = meter_provider.meter(METER_NAME);
    let _ = OP_DURATION.set(
        meter
            .f64_histogram("dex_op_duration_seconds")
            .with_unit("s")
            .with_description("Duration of pool operations")
            .build(),
    );
    let _ = INVARIANT_GROWTH.set(
        meter
            .u64_histogram("dex_invariant_growth_ppb")
            .with_unit("1e-9")
            .with_description("Relative growth of the constant product per swap (Δk/k, ppb)")
            .build(),
    );

    Ok(Telemetry { tracer_provider, meter_provider })
}

/// Cria um `Span` INFO com nome **estático** (exigência do tracing) e
/// coloca o nome dinâmico em `span_name`. Inclui `git_commit_sha`.
pub fn make_info_span(name: &str, op_id: u64, component: &str) -> tracing::Span {
    let commit = commit_sha();
    tracing::span!(
        target: "dex_core",
        Level::INFO,
        "op",
        git_commit_sha = %commit,
        span_name = %name,
        op_id = op_id,
        component = component
    )
}

fn op_duration() -> &'static Histogram<f64> {
    OP_DURATION.get_or_init(|| {
        global::meter(METER_NAME)
            .f64_histogram("dex_op_duration_seconds")
            .with_unit("s")
            .with_description("Duration of pool operations")
            .build()
    })
}

fn invariant_growth() -> &'static Histogram<u64> {
    INVARIANT_GROWTH.get_or_init(|| {
        global::meter(METER_NAME)
            .u64_histogram("dex_invariant_growth_ppb")
            .with_unit("1e-9")
            .with_description("Relative growth of the constant product per swap (Δk/k, ppb)")
            .build()
    })
}

/// Executa `f` e registra a duração em `dex_op_duration_seconds{op}`.
pub fn time_op<F, T>(op: &'static str, f: F) -> T
where
    F: FnOnce() -> T,
{
    let start = Instant::now();
    let out = f();
    let sec = start.elapsed().as_secs_f64();
    op_duration().record(sec, &[KeyValue::new("op", op)]);
    out
}

/// `Δk/k` em partes por bilhão (inteiro, floor, saturado em `u64::MAX`).
pub fn invariant_growth_ppb(before: &PoolSnapshot, after: &PoolSnapshot) -> u64 {
    let k0 = mul_wide(before.base_reserve, before.token_reserve);
    let k1 = mul_wide(after.base_reserve, after.token_reserve);
    if k0.is_zero() || k1 <= k0 {
        return 0;
    }
    match (k1 - k0).checked_mul(U512::from(PPB)) {
        Some(scaled) => {
            let ppb = scaled / k0;
            if ppb > U512::from(u64::MAX) {
                u64::MAX
            } else {
                ppb.low_u64()
            }
        }
        None => u64::MAX,
    }
}

pub fn record_invariant_growth(direction: Direction, before: &PoolSnapshot, after: &PoolSnapshot) {
    let ppb = invariant_growth_ppb(before, after);
    invariant_growth().record(ppb, &[KeyValue::new("direction", direction.as_str())]);
}
