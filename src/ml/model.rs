use burn::{
    module::Ignored,
    nn::{
        gru::{Gru, GruConfig},
        loss::BinaryCrossEntropyLossConfig,
        Dropout, DropoutConfig,
        Embedding, EmbeddingConfig,
        Initializer,
        Linear, LinearConfig,
    },
    prelude::*,
    tensor::activation,
};

use crate::domain::hyperparams::{Activation, Hyperparameters};

/// Every kernel starts uniform in this symmetric range.
const INIT_RANGE: f64 = 0.05;

fn uniform() -> Initializer {
    Initializer::Uniform { min: -INIT_RANGE, max: INIT_RANGE }
}

pub fn activate<B: Backend, const D: usize>(x: Tensor<B, D>, act: Activation) -> Tensor<B, D> {
    match act {
        Activation::Linear  => x,
        Activation::Tanh    => activation::tanh(x),
        Activation::Relu    => activation::relu(x),
        Activation::Sigmoid => activation::sigmoid(x),
        // elu(x) = x for x > 0, exp(x) - 1 otherwise
        Activation::Elu     => x.clone().clamp_min(0.0) + x.clamp_max(0.0).exp().sub_scalar(1.0),
    }
}

/// L1/L2 weight penalty applied to the kernels (never the biases).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Regularizer {
    pub l1: Option<f64>,
    pub l2: Option<f64>,
}

impl Regularizer {
    pub fn is_active(&self) -> bool {
        self.l1.is_some() || self.l2.is_some()
    }

    fn kernel<B: Backend>(&self, weight: Tensor<B, 2>) -> Tensor<B, 1> {
        let device = weight.device();
        let mut total = Tensor::<B, 1>::zeros([1], &device);
        if let Some(l1) = self.l1 {
            total = total + weight.clone().abs().sum().mul_scalar(l1);
        }
        if let Some(l2) = self.l2 {
            total = total + weight.powf_scalar(2.0).sum().mul_scalar(l2);
        }
        total
    }
}

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize
// internally, do NOT add them again or you get conflicting impls.
#[derive(Config, Debug)]
pub struct RnnClassifierConfig {
    pub n_tokens:          usize,
    pub len_max:           usize,
    pub embedding_dim:     usize,
    pub rnn_neurons:       usize,
    pub rnn_activation:    Activation,
    pub hidden:            Vec<usize>,
    pub hidden_activation: Activation,
    #[config(default = false)]
    pub use_gru:           bool,
    pub dropout:           Option<f64>,
    pub l1:                Option<f64>,
    pub l2:                Option<f64>,
}

impl RnnClassifierConfig {
    pub fn from_hyperparameters(hp: &Hyperparameters, n_tokens: usize, len_max: usize) -> Self {
        Self::new(
            n_tokens,
            len_max,
            hp.embedding_length,
            hp.rnn_neurons,
            hp.rnn_activation,
            hp.hidden.clone(),
            hp.hidden_activation,
        )
        .with_use_gru(hp.use_gru)
        .with_dropout(hp.dropout)
        .with_l1(hp.l1)
        .with_l2(hp.l2)
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> RnnClassifier<B> {
        let embedding = EmbeddingConfig::new(self.n_tokens, self.embedding_dim)
            .with_initializer(uniform())
            .init(device);

        let (rnn, gru) = if self.use_gru {
            let gru = GruConfig::new(self.embedding_dim, self.rnn_neurons, true)
                .with_initializer(uniform())
                .init(device);
            (None, Some(gru))
        } else {
            (Some(self.build_simple_rnn(device)), None)
        };

        let mut d_in = self.rnn_neurons;
        let dense: Vec<DenseBlock<B>> = self
            .hidden
            .iter()
            .map(|&width| {
                let block = DenseBlock {
                    linear:     LinearConfig::new(d_in, width).with_initializer(uniform()).init(device),
                    activation: Ignored(self.hidden_activation),
                    dropout:    self.dropout.map(|p| DropoutConfig::new(p).init()),
                };
                d_in = width;
                block
            })
            .collect();

        let output = LinearConfig::new(d_in, 1).with_initializer(uniform()).init(device);

        RnnClassifier {
            embedding, rnn, gru, dense, output,
            regularizer: Ignored(Regularizer { l1: self.l1, l2: self.l2 }),
            d_hidden:    self.rnn_neurons,
            len_max:     self.len_max,
        }
    }

    fn build_simple_rnn<B: Backend>(&self, device: &B::Device) -> SimpleRnn<B> {
        let input = LinearConfig::new(self.embedding_dim, self.rnn_neurons)
            .with_initializer(uniform())
            .init(device);
        let recurrent = LinearConfig::new(self.rnn_neurons, self.rnn_neurons)
            .with_bias(false)
            .with_initializer(uniform())
            .init(device);
        SimpleRnn { input, recurrent, activation: Ignored(self.rnn_activation) }
    }
}

/// Elman recurrence: h_t = act(W x_t + U h_{t-1} + b), h_0 = 0.
#[derive(Module, Debug)]
pub struct SimpleRnn<B: Backend> {
    pub input:      Linear<B>,
    pub recurrent:  Linear<B>,
    pub activation: Ignored<Activation>,
}

impl<B: Backend> SimpleRnn<B> {
    /// x: [batch, seq_len, d_in] → last hidden state [batch, d_hidden]
    pub fn forward(&self, x: Tensor<B, 3>) -> Tensor<B, 2> {
        let [batch_size, seq_len, _] = x.dims();
        let d_hidden = self.recurrent.weight.dims()[0];

        // Project every time step at once, then walk the sequence.
        let projected = self.input.forward(x);
        let mut h = Tensor::<B, 2>::zeros([batch_size, d_hidden], &projected.device());
        for t in 0..seq_len {
            let x_t = projected
                .clone()
                .slice([0..batch_size, t..t + 1, 0..d_hidden])
                .reshape([batch_size, d_hidden]);
            h = activate(x_t + self.recurrent.forward(h), *self.activation);
        }
        h
    }
}

#[derive(Module, Debug)]
pub struct DenseBlock<B: Backend> {
    pub linear:     Linear<B>,
    pub activation: Ignored<Activation>,
    pub dropout:    Option<Dropout>,
}

impl<B: Backend> DenseBlock<B> {
    pub fn forward(&self, x: Tensor<B, 2>) -> Tensor<B, 2> {
        let x = activate(self.linear.forward(x), *self.activation);
        match &self.dropout {
            Some(dropout) => dropout.forward(x),
            None          => x,
        }
    }
}

#[derive(Module, Debug)]
pub struct RnnClassifier<B: Backend> {
    pub embedding:   Embedding<B>,
    pub rnn:         Option<SimpleRnn<B>>,
    pub gru:         Option<Gru<B>>,
    pub dense:       Vec<DenseBlock<B>>,
    pub output:      Linear<B>,
    pub regularizer: Ignored<Regularizer>,
    pub d_hidden:    usize,
    pub len_max:     usize,
}

impl<B: Backend> RnnClassifier<B> {
    /// tokens: [batch, len_max] → one logit per row: [batch]
    pub fn forward_logits(&self, tokens: Tensor<B, 2, Int>) -> Tensor<B, 1> {
        let x = self.embedding.forward(tokens);
        let mut x = self.encode(x);
        for block in &self.dense {
            x = block.forward(x);
        }
        self.output.forward(x).flatten::<1>(0, 1)
    }

    /// Sigmoid probabilities: [batch]
    pub fn forward(&self, tokens: Tensor<B, 2, Int>) -> Tensor<B, 1> {
        activation::sigmoid(self.forward_logits(tokens))
    }

    /// Binary cross-entropy plus the weight penalty. Returns the loss and the logits.
    pub fn forward_loss(
        &self,
        tokens:  Tensor<B, 2, Int>,
        targets: Tensor<B, 1, Int>,
    ) -> (Tensor<B, 1>, Tensor<B, 1>) {
        let logits = self.forward_logits(tokens);
        let bce = BinaryCrossEntropyLossConfig::new()
            .with_logits(true)
            .init(&logits.device());
        let mut loss = bce.forward(logits.clone(), targets);
        if let Some(penalty) = self.penalty() {
            loss = loss + penalty;
        }
        (loss, logits)
    }

    /// Sum of the L1/L2 terms over the recurrent input kernel, the dense
    /// kernels and the output kernel. `None` when no regularisation is set.
    pub fn penalty(&self) -> Option<Tensor<B, 1>> {
        let reg = *self.regularizer;
        if !reg.is_active() {
            return None;
        }

        let mut total = reg.kernel(self.output.weight.val());
        if let Some(rnn) = &self.rnn {
            total = total + reg.kernel(rnn.input.weight.val());
        }
        for block in &self.dense {
            total = total + reg.kernel(block.linear.weight.val());
        }
        Some(total)
    }

    fn encode(&self, x: Tensor<B, 3>) -> Tensor<B, 2> {
        let [batch_size, seq_len, _] = x.dims();
        match (&self.rnn, &self.gru) {
            (Some(rnn), _) => rnn.forward(x),
            (None, Some(gru)) => {
                let d_hidden = self.d_hidden;
                if seq_len == 0 {
                    return Tensor::zeros([batch_size, d_hidden], &x.device());
                }
                gru.forward(x, None)
                    .slice([0..batch_size, seq_len - 1..seq_len, 0..d_hidden])
                    .reshape([batch_size, d_hidden])
            }
            (None, None) => unreachable!("RnnClassifierConfig::init always builds one recurrent layer"),
        }
    }

    /// Plain-text architecture table, one row per layer.
    pub fn summary(&self) -> String {
        let mut rows: Vec<(String, String, usize)> = Vec::new();
        let [n_tokens, emb] = self.embedding.weight.dims();
        rows.push((
            format!("embedding ({n_tokens} tokens)"),
            format!("[batch, {}, {emb}]", self.len_max),
            self.embedding.num_params(),
        ));

        match (&self.rnn, &self.gru) {
            (Some(rnn), _) => {
                rows.push((
                    format!("simple_rnn ({})", *rnn.activation),
                    format!("[batch, {}]", self.d_hidden),
                    rnn.num_params(),
                ));
            }
            (None, Some(gru)) => {
                rows.push(("gru".to_string(), format!("[batch, {}]", self.d_hidden), gru.num_params()));
            }
            (None, None) => {}
        }

        for (i, block) in self.dense.iter().enumerate() {
            let width = block.linear.weight.dims()[1];
            rows.push((
                format!("dense_{i} ({})", *block.activation),
                format!("[batch, {width}]"),
                block.linear.num_params(),
            ));
            if block.dropout.is_some() {
                rows.push((format!("dropout_{i}"), format!("[batch, {width}]"), 0));
            }
        }
        rows.push(("output (sigmoid)".to_string(), "[batch, 1]".to_string(), self.output.num_params()));

        let mut out = format!("{:<28} {:<20} {:>10}\n", "Layer", "Output shape", "Params");
        out.push_str(&"=".repeat(60));
        out.push('\n');
        for (name, shape, params) in &rows {
            out.push_str(&format!("{name:<28} {shape:<20} {params:>10}\n"));
        }
        out.push_str(&"=".repeat(60));
        out.push('\n');
        out.push_str(&format!("Total params: {}\n", self.num_params()));
        out
    }
}
