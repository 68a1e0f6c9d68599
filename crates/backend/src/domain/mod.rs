pub mod a001_packing_template;
pub mod a002_packing_rule;
pub mod a003_return_request;
