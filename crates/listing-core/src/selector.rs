//! Selección del artifact más reciente entre varios candidatos.
//!
//! `select_latest` toma el máximo lexicográfico de las keys sin interpretar
//! timestamps; es correcto porque `naming` garantiza que el orden de las keys
//! es el cronológico. `select_latest_conforming` añade antes una validación
//! explícita del formato para no confiar a ciegas en ese orden cuando el
//! prefijo contiene objetos ajenos al esquema de nombres.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::errors::FlowError;
use crate::naming::ArtifactNaming;

/// Qué hacer con keys que no respetan el esquema de nombres.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MalformedKeyPolicy {
    /// Se descartan con un `warn!`.
    #[default]
    SkipMalformed,
    /// La selección falla con `MalformedArtifactKey`.
    Strict,
}

/// Máximo lexicográfico. Falla con `EmptyCandidateSet` si no hay candidatos.
/// El resultado siempre es un elemento de `candidates`.
pub fn select_latest<I, S>(candidates: I) -> Result<String, FlowError>
    where I: IntoIterator<Item = S>,
          S: AsRef<str>
{
    candidates.into_iter()
              .map(|c| c.as_ref().to_string())
              .max()
              .ok_or_else(|| FlowError::EmptyCandidateSet(String::new()))
}

/// Valida el formato de cada candidato según `naming` y luego aplica
/// `select_latest` sobre los que cumplen.
pub fn select_latest_conforming<I, S>(naming: &ArtifactNaming,
                                      candidates: I,
                                      policy: MalformedKeyPolicy)
                                      -> Result<String, FlowError>
    where I: IntoIterator<Item = S>,
          S: AsRef<str>
{
    let mut conforming: Vec<String> = Vec::new();
    for candidate in candidates {
        let key = candidate.as_ref();
        if naming.conforms(key) {
            conforming.push(key.to_string());
            continue;
        }
        match policy {
            MalformedKeyPolicy::SkipMalformed => warn!("ignoring key outside naming scheme '{}': {key}", naming.prefix()),
            MalformedKeyPolicy::Strict => return Err(FlowError::MalformedArtifactKey(key.to_string())),
        }
    }
    select_latest(conforming).map_err(|_| FlowError::EmptyCandidateSet(naming.prefix().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    const MARCH: &str = "response_data_2025-03-01-00-00-00.csv";
    const FEB: &str = "response_data_2025-02-28-00-00-00.csv";

    #[test]
    fn picks_most_recent_key() {
        let set: BTreeSet<&str> = [FEB, MARCH].into_iter().collect();
        assert_eq!(select_latest(&set).expect("non-empty"), MARCH);
        assert_eq!(select_latest([MARCH, FEB]).expect("order independent"), MARCH);
    }

    #[test]
    fn empty_set_fails() {
        let empty: Vec<String> = vec![];
        assert!(matches!(select_latest(empty), Err(FlowError::EmptyCandidateSet(_))));
    }

    #[test]
    fn selection_is_idempotent() {
        let sets: Vec<Vec<&str>> = vec![vec![MARCH],
                                        vec![FEB, MARCH],
                                        vec![MARCH, MARCH],
                                        vec!["a", "b", "ab", "", "ba"]];
        for s in sets {
            let first = select_latest(&s).expect("non-empty");
            assert!(s.contains(&first.as_str()), "result must come from the set");
            assert_eq!(select_latest([first.as_str()]).expect("singleton"), first);
        }
    }

    #[test]
    fn conforming_selection_skips_foreign_keys() {
        let naming = ArtifactNaming::new("response_data", "csv");
        // "response_data_zzz.csv" ganaría por orden lexicográfico puro.
        let keys = [FEB, MARCH, "response_data_zzz.csv", "response_data_2025-3-9-0-0-0.csv"];
        assert_eq!(select_latest(keys).expect("raw"), "response_data_zzz.csv");
        let picked = select_latest_conforming(&naming, keys, MalformedKeyPolicy::SkipMalformed).expect("conforming");
        assert_eq!(picked, MARCH);
    }

    #[test]
    fn strict_policy_rejects_foreign_keys() {
        let naming = ArtifactNaming::new("response_data", "csv");
        let err = select_latest_conforming(&naming, [MARCH, "response_data_backup.csv"], MalformedKeyPolicy::Strict).unwrap_err();
        assert_eq!(err, FlowError::MalformedArtifactKey("response_data_backup.csv".into()));
    }

    #[test]
    fn only_malformed_keys_means_empty_set() {
        let naming = ArtifactNaming::new("response_data", "csv");
        let err = select_latest_conforming(&naming, ["response_data_backup.csv"], MalformedKeyPolicy::SkipMalformed).unwrap_err();
        assert_eq!(err, FlowError::EmptyCandidateSet("response_data".into()));
    }
}
