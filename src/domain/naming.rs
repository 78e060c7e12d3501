// ============================================================
// Layer 3 - Output File Naming
// ============================================================
// Every run writes its artefacts under a base name that encodes
// the hyperparameters, so results are self-describing and a
// re-submitted job can tell whether it already ran.
//
// Format (pieces in braces are omitted when the option is unset):
//
//   {results}/amino_{exp_}{label_}_epochs_{epochs_}_hidden_{h1_h2}_
//       {drop_D_}{L1_X_}{L2_Y_}LR_Z_ntrain_NN_rot_RR
//
// After formatting, every '.' except the very first character is
// turned into '-' so float values never look like file extensions
// while a leading "./" on the results directory survives.

use crate::domain::experiment::ExperimentConfig;

/// Deterministic base path (no extension) for a run's artefacts.
pub fn generate_fname(cfg: &ExperimentConfig) -> String {
    let hidden_str = cfg
        .hidden
        .iter()
        .map(|h| h.to_string())
        .collect::<Vec<_>>()
        .join("_");

    let dropout_str = cfg.dropout.map(|d| format!("drop_{d:.3}_")).unwrap_or_default();
    let l1_str      = cfg.l1.map(|v| format!("L1_{v:.6}_")).unwrap_or_default();
    let l2_str      = cfg.l2.map(|v| format!("L2_{v:.6}_")).unwrap_or_default();
    let label_str   = cfg.label.as_ref().map(|l| format!("{l}_")).unwrap_or_default();
    let exp_str     = cfg.exp_type.as_ref().map(|e| format!("{e}_")).unwrap_or_default();
    let epochs_str  = format!("{}_", cfg.epochs);
    let lrate_str   = format!("LR_{:.6}_", cfg.lrate);

    let fname = format!(
        "{}/amino_{}{}_epochs_{}_hidden_{}_{}{}{}{}ntrain_{:02}_rot_{:02}",
        cfg.results_path,
        exp_str,
        label_str,
        epochs_str,
        hidden_str,
        dropout_str,
        l1_str,
        l2_str,
        lrate_str,
        cfg.n_training,
        cfg.rotation,
    );

    dashify_dots(&fname)
}

/// Keep the first character as-is and replace every later '.' with '-'.
fn dashify_dots(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => {
            let mut out = String::with_capacity(s.len());
            out.push(first);
            out.extend(chars.map(|c| if c == '.' { '-' } else { c }));
            out
        }
        None => String::new(),
    }
}

/// `<base>_results.pkl`
pub fn results_file(base: &str) -> String {
    format!("{base}_results.pkl")
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_name() {
        let cfg = ExperimentConfig::default();
        assert_eq!(
            generate_fname(&cfg),
            "./results/amino__epochs_100__hidden_100_5_LR_0-001000_ntrain_03_rot_00"
        );
    }

    #[test]
    fn test_all_options_present() {
        let cfg = ExperimentConfig {
            exp_type: Some("dropout".into()),
            label:    Some("gpu".into()),
            dropout:  Some(0.25),
            l1:       Some(0.001),
            l2:       Some(0.0001),
            rotation: 4,
            ..Default::default()
        };
        assert_eq!(
            generate_fname(&cfg),
            "./results/amino_dropout_gpu__epochs_100__hidden_100_5_drop_0-250_\
             L1_0-001000_L2_0-000100_LR_0-001000_ntrain_03_rot_04"
        );
    }

    #[test]
    fn test_deterministic() {
        let cfg = ExperimentConfig { dropout: Some(0.5), ..Default::default() };
        assert_eq!(generate_fname(&cfg), generate_fname(&cfg.clone()));
    }

    #[test]
    fn test_distinguishing_fields_give_distinct_names() {
        let base = ExperimentConfig::default();
        let variants = [
            ExperimentConfig { dropout: Some(0.1), ..base.clone() },
            ExperimentConfig { dropout: Some(0.2), ..base.clone() },
            ExperimentConfig { l1: Some(0.01), ..base.clone() },
            ExperimentConfig { l2: Some(0.01), ..base.clone() },
            ExperimentConfig { label: Some("a".into()), ..base.clone() },
            ExperimentConfig { label: Some("b".into()), ..base.clone() },
            base.clone(),
        ];
        let mut names: Vec<String> = variants.iter().map(generate_fname).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), variants.len());
    }

    #[test]
    fn test_only_first_character_dot_survives() {
        assert_eq!(dashify_dots("./a.b.c"), "./a-b-c");
        assert_eq!(dashify_dots("abs/x.y"), "abs/x-y");
        assert_eq!(dashify_dots(""), "");
    }

    #[test]
    fn test_results_file() {
        assert_eq!(results_file("r/base"), "r/base_results.pkl");
    }
}
