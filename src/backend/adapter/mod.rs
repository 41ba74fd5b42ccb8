pub mod ledger_adapter;
