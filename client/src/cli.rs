use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use common::{
    AggregateResult, AnalyzerSnapshot, ErrorBody, MetricsDelta, ProcessChunkRequest,
    WorkerHeartbeatRequest, WorkerInfo, WorkerRegisterRequest,
};
use reqwest::{Client, Response};
use std::env;

/// - En Docker: COORDINATOR_URL=http://coordinator:8000
/// - Local: default http://localhost:8000
fn coordinator_base_url() -> String {
    env::var("COORDINATOR_URL").unwrap_or_else(|_| "http://localhost:8000".to_string())
}

#[derive(Parser)]
#[command(name = "client")]
#[command(about = "CLI simple para hablar con el coordinator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Procesa un log repartiéndolo entre los workers
    Process {
        /// Ruta del log (tal como la ven coordinator y workers)
        #[arg(value_name = "FILEPATH")]
        filepath: String,

        #[arg(long, default_value_t = 1024 * 1024)]
        chunk_size: i64,
    },

    /// Lista los workers registrados
    Workers,

    /// Registra un worker a mano
    Register {
        #[arg(value_name = "WORKER_ID")]
        id: String,
        #[arg(value_name = "WORKER_URL")]
        url: String,
    },

    /// Manda un heartbeat en nombre de un worker
    Heartbeat {
        #[arg(value_name = "WORKER_ID")]
        id: String,
    },

    /// Muestra el acumulador global de métricas
    Metrics,

    /// Suma un delta al acumulador global
    PushMetrics {
        #[arg(long, default_value_t = 0.0)]
        error_rate_per_minute: f64,
        #[arg(long, default_value_t = 0.0)]
        average_response_time: f64,
        #[arg(long, default_value_t = 0.0)]
        request_count_per_second: f64,
    },

    /// Pone el acumulador global en cero
    ResetMetrics,
}

/// Convierte una respuesta no-2xx en error, usando el ErrorBody si viene.
async fn check(resp: Response) -> Result<Response> {
    if resp.status().is_success() {
        return Ok(resp);
    }
    let status = resp.status();
    let text = resp.text().await.unwrap_or_default();
    match serde_json::from_str::<ErrorBody>(&text) {
        Ok(body) => {
            let mut msg = format!("{} ({})", body.error, status);
            if let (Some(w), Some(i)) = (body.worker_id, body.chunk_index) {
                msg.push_str(&format!(" [worker={w}, chunk={i}]"));
            }
            bail!(msg)
        }
        Err(_) => bail!("el coordinator respondió {}: {}", status, text),
    }
}

fn print_snapshot(title: &str, s: &AnalyzerSnapshot) {
    println!("{}:", title);
    println!("  error_rate_per_minute    : {}", s.error_rate_per_minute);
    println!("  average_response_time    : {}", s.average_response_time);
    println!("  request_count_per_second : {}", s.request_count_per_second);
    println!("  updates                  : {}", s.updates);
    println!("  desde                    : {}", s.since);
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    let client = Client::new();
    let base_url = coordinator_base_url();

    match cli.command {
        Commands::Process {
            filepath,
            chunk_size,
        } => {
            let url = format!("{}/process_chunk", base_url);
            let req = ProcessChunkRequest {
                filepath: filepath.clone(),
                chunk_size,
            };

            let resp = check(client.post(&url).json(&req).send().await?).await?;
            let agg: AggregateResult = resp.json().await?;

            println!("Resultado para {}:", filepath);
            println!("  requests         : {}", agg.requests_per_second);
            println!("  avg_response_ms  : {:.2}", agg.avg_response_time);
            println!("  malformed_lines  : {}", agg.malformed_lines);
            println!("  error_rate       : {}", agg.error_rate);
        }

        Commands::Workers => {
            let url = format!("{}/workers", base_url);
            let resp = check(client.get(&url).send().await?).await?;
            let workers: Vec<WorkerInfo> = resp.json().await?;

            if workers.is_empty() {
                println!("No hay workers registrados.");
            }
            for w in workers {
                println!("Worker {}", w.worker_id);
                println!("  url            : {}", w.worker_url);
                println!("  estado         : {:?}", w.status);
                println!("  registrado     : {}", w.registered_at);
                println!("  last_heartbeat : {} s ago", w.last_heartbeat_secs_ago);
                match w.cpu_percent {
                    Some(cpu) => println!("  cpu_percent    : {:.1}%", cpu),
                    None => println!("  cpu_percent    : (sin datos)"),
                }
                match w.mem_bytes {
                    Some(mem) => println!("  mem_bytes      : {}", mem),
                    None => println!("  mem_bytes      : (sin datos)"),
                }
                println!();
            }
        }

        Commands::Register { id, url } => {
            let endpoint = format!("{}/register", base_url);
            let resp = check(
                client
                    .post(&endpoint)
                    .json(&WorkerRegisterRequest {
                        worker_id: id,
                        worker_url: url,
                    })
                    .send()
                    .await?,
            )
            .await?;
            println!("{}", resp.text().await?);
        }

        Commands::Heartbeat { id } => {
            let endpoint = format!("{}/heartbeat", base_url);
            let resp = check(
                client
                    .post(&endpoint)
                    .json(&WorkerHeartbeatRequest::bare(id))
                    .send()
                    .await?,
            )
            .await?;
            println!("{}", resp.text().await?);
        }

        Commands::Metrics => {
            let url = format!("{}/metrics", base_url);
            let resp = check(client.get(&url).send().await?).await?;
            let snap: AnalyzerSnapshot = resp.json().await?;
            print_snapshot("Métricas acumuladas", &snap);
        }

        Commands::PushMetrics {
            error_rate_per_minute,
            average_response_time,
            request_count_per_second,
        } => {
            let url = format!("{}/metrics", base_url);
            let delta = MetricsDelta {
                error_rate_per_minute,
                average_response_time,
                request_count_per_second,
            };
            let resp = check(client.post(&url).json(&delta).send().await?).await?;
            let snap: AnalyzerSnapshot = resp.json().await?;
            print_snapshot("Métricas acumuladas", &snap);
        }

        Commands::ResetMetrics => {
            let url = format!("{}/metrics/reset", base_url);
            let resp = check(client.post(&url).send().await?).await?;
            let prev: AnalyzerSnapshot = resp.json().await?;
            print_snapshot("Acumulador reiniciado; valores anteriores", &prev);
        }
    }

    Ok(())
}
