pub mod selector;

pub use selector::{
  calculate_all_weights, card_weight, select_uniform, select_weighted, total_weight, CardWeight,
};
