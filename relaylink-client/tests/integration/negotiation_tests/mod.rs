pub mod test_host_offers_after_approval;
pub mod test_stale_and_unexpected_signals;
pub mod test_two_clients_negotiate;
