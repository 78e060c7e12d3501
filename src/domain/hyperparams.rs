// ============================================================
// Layer 3 - Hyperparameters
// ============================================================
// The immutable record that fully determines one model:
// architecture widths, activations, regularisation and the
// optimiser settings. Built once from an ExperimentConfig and
// handed to the model builder; nothing mutates it afterwards.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Element-wise nonlinearity for the recurrent and dense layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Activation {
    Linear,
    Tanh,
    Relu,
    Elu,
    Sigmoid,
}

impl FromStr for Activation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "linear" | "none" => Ok(Self::Linear),
            "tanh"            => Ok(Self::Tanh),
            "relu"            => Ok(Self::Relu),
            "elu"             => Ok(Self::Elu),
            "sigmoid"         => Ok(Self::Sigmoid),
            other => Err(format!("unknown activation '{other}'")),
        }
    }
}

impl fmt::Display for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Linear  => "linear",
            Self::Tanh    => "tanh",
            Self::Relu    => "relu",
            Self::Elu     => "elu",
            Self::Sigmoid => "sigmoid",
        };
        f.write_str(name)
    }
}

/// Validation quantity watched by early stopping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Monitor {
    ValLoss,
    ValAuc,
    ValBinaryAccuracy,
}

impl Monitor {
    /// Loss improves downwards, the other two upwards.
    pub fn lower_is_better(self) -> bool {
        matches!(self, Self::ValLoss)
    }
}

impl FromStr for Monitor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "val_loss"            => Ok(Self::ValLoss),
            "val_auc"             => Ok(Self::ValAuc),
            "val_binary_accuracy" => Ok(Self::ValBinaryAccuracy),
            other => Err(format!("unknown monitor '{other}'")),
        }
    }
}

impl fmt::Display for Monitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ValLoss           => "val_loss",
            Self::ValAuc            => "val_auc",
            Self::ValBinaryAccuracy => "val_binary_accuracy",
        };
        f.write_str(name)
    }
}

/// What to do with a validation/test label the training split never produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnknownLabelPolicy {
    /// Encode as `-1` and log how many rows were affected
    Sentinel,
    /// Fail the assembly with `DatasetError::UnknownLabel`
    Reject,
}

impl FromStr for UnknownLabelPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sentinel" => Ok(Self::Sentinel),
            "reject"   => Ok(Self::Reject),
            other => Err(format!("unknown label policy '{other}'")),
        }
    }
}

/// Architecture and optimiser knobs for one model instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hyperparameters {
    pub embedding_length:  usize,
    pub rnn_neurons:       usize,
    pub rnn_activation:    Activation,
    pub use_gru:           bool,
    pub hidden:            Vec<usize>,
    pub hidden_activation: Activation,
    pub dropout:           Option<f64>,
    pub l1:                Option<f64>,
    pub l2:                Option<f64>,
    pub lrate:             f64,
    pub decay:             f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activation_parse_round_trip() {
        for a in [Activation::Linear, Activation::Tanh, Activation::Relu, Activation::Elu, Activation::Sigmoid] {
            assert_eq!(a.to_string().parse::<Activation>().unwrap(), a);
        }
        assert_eq!("None".parse::<Activation>().unwrap(), Activation::Linear);
        assert!("swish".parse::<Activation>().is_err());
    }

    #[test]
    fn test_monitor_direction() {
        assert!(Monitor::ValLoss.lower_is_better());
        assert!(!Monitor::ValAuc.lower_is_better());
        assert_eq!("val_auc".parse::<Monitor>().unwrap(), Monitor::ValAuc);
    }
}
