use std::{
    fs::File,
    io::{self, BufRead, BufReader, Seek, SeekFrom},
    sync::OnceLock,
};

use regex::Regex;
use thiserror::Error;

use crate::results::ChunkResult;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("archivo no encontrado: {0}")]
    FileNotFound(String),
    #[error("error de lectura: {0}")]
    Io(#[from] io::Error),
}

/// `<token> <token> Request processed in <n>ms`, anclado al inicio de la línea.
fn line_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(\S+) (\S+) Request processed in (\d+)ms").expect("patrón de línea válido")
    })
}

/// Devuelve el tiempo de respuesta en ms si la línea tiene el formato esperado.
pub fn parse_line(line: &str) -> Option<u64> {
    let caps = line_pattern().captures(line)?;
    caps.get(3)?.as_str().parse::<u64>().ok()
}

#[derive(Debug, Default)]
struct LineStats {
    total_requests: u64,
    total_time_ms: u64,
    malformed_lines: u64,
}

impl LineStats {
    fn record(&mut self, line: &str) {
        match parse_line(line) {
            Some(ms) => {
                self.total_requests += 1;
                self.total_time_ms = self.total_time_ms.saturating_add(ms);
            }
            None => self.malformed_lines += 1,
        }
    }

    fn finish(self) -> ChunkResult {
        let avg_response_time = if self.total_requests > 0 {
            self.total_time_ms as f64 / self.total_requests as f64
        } else {
            0.0
        };

        ChunkResult {
            requests_per_second: self.total_requests,
            avg_response_time,
            malformed_lines: self.malformed_lines,
            error_rate: 0.0,
        }
    }
}

/// Lee desde `start` líneas completas hasta pasarse de `budget` bytes y
/// calcula las métricas del chunk.
///
/// Se sigue leyendo mientras lo consumido no supere el presupuesto: con un
/// presupuesto exacto de una línea se leen dos. Si `start` cae a mitad de
/// una línea, ese pedazo cuenta como una línea (normalmente malformada).
pub fn scan_chunk(filepath: &str, start: u64, budget: u64) -> Result<ChunkResult, ScanError> {
    let file = File::open(filepath).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => ScanError::FileNotFound(filepath.to_string()),
        _ => ScanError::Io(e),
    })?;
    let mut reader = BufReader::new(file);
    reader.seek(SeekFrom::Start(start))?;

    let mut stats = LineStats::default();
    let mut consumed: u64 = 0;
    let mut buf = Vec::new();

    while consumed <= budget {
        buf.clear();
        let n = reader.read_until(b'\n', &mut buf)?;
        if n == 0 {
            break; // EOF
        }
        consumed += n as u64;
        stats.record(&String::from_utf8_lossy(&buf));
    }

    Ok(stats.finish())
}
