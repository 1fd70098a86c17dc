pub mod contributors;
pub mod location_histories;
pub mod locations;
pub mod pesticide_adjacency;
pub mod pesticides;
pub mod phenotypes;
pub mod sample_adjacency;
pub mod sample_contributions;
pub mod sample_pesticides;
pub mod sample_taxa;
pub mod samples;
pub mod taxa;
