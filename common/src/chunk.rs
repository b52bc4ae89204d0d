use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rango contiguo de bytes del archivo de entrada.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub offset: u64,
    pub length: u64,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlanError {
    #[error("chunk_size inválido: {0} (debe ser > 0)")]
    InvalidArgument(i64),
}

/// Parte `[0, file_size)` en chunks de `chunk_size` bytes.
///
/// Todos los chunks declaran `length == chunk_size`; el último puede pasarse
/// del final del archivo y es el lector quien recorta. Un archivo vacío
/// produce cero chunks.
pub fn plan_chunks(file_size: u64, chunk_size: i64) -> Result<Vec<Chunk>, PlanError> {
    if chunk_size <= 0 {
        return Err(PlanError::InvalidArgument(chunk_size));
    }
    let length = chunk_size as u64;

    let mut chunks = Vec::with_capacity(file_size.div_ceil(length) as usize);
    let mut offset: u64 = 0;
    while offset < file_size {
        chunks.push(Chunk { offset, length });
        offset = match offset.checked_add(length) {
            Some(next) => next,
            None => break,
        };
    }

    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_cubre_sin_huecos(file_size: u64, chunk_size: i64) {
        let chunks = plan_chunks(file_size, chunk_size).unwrap();

        let mut expected_offset = 0;
        for c in &chunks {
            assert_eq!(c.offset, expected_offset, "hueco o solape en {:?}", c);
            assert_eq!(c.length, chunk_size as u64);
            expected_offset += c.length;
        }
        assert!(expected_offset >= file_size);
        // el último chunk empieza dentro del archivo
        if let Some(last) = chunks.last() {
            assert!(last.offset < file_size);
        }
    }

    #[test]
    fn plan_divide_exacto() {
        let chunks = plan_chunks(100, 10).unwrap();
        assert_eq!(chunks.len(), 10);
        assert_eq!(chunks[0], Chunk { offset: 0, length: 10 });
        assert_eq!(chunks[9], Chunk { offset: 90, length: 10 });
    }

    #[test]
    fn plan_ultimo_chunk_se_pasa_del_final() {
        let chunks = plan_chunks(25, 10).unwrap();
        assert_eq!(
            chunks,
            vec![
                Chunk { offset: 0, length: 10 },
                Chunk { offset: 10, length: 10 },
                Chunk { offset: 20, length: 10 },
            ]
        );
    }

    #[test]
    fn plan_archivo_vacio_no_genera_chunks() {
        assert!(plan_chunks(0, 4096).unwrap().is_empty());
    }

    #[test]
    fn plan_chunk_mas_grande_que_el_archivo() {
        assert_eq!(
            plan_chunks(3, 1024).unwrap(),
            vec![Chunk { offset: 0, length: 1024 }]
        );
    }

    #[test]
    fn plan_rechaza_chunk_size_no_positivo() {
        assert_eq!(plan_chunks(10, 0), Err(PlanError::InvalidArgument(0)));
        assert_eq!(plan_chunks(10, -5), Err(PlanError::InvalidArgument(-5)));
    }

    #[test]
    fn plan_cubre_todo_el_archivo() {
        for file_size in [0_u64, 1, 7, 64, 65, 1000, 4097] {
            for chunk_size in [1_i64, 2, 3, 64, 1000, 5000] {
                assert_cubre_sin_huecos(file_size, chunk_size);
            }
        }
    }

    #[test]
    fn plan_es_determinista() {
        assert_eq!(plan_chunks(12345, 77), plan_chunks(12345, 77));
    }
}
