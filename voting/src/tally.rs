/// Index of the proposal with the highest vote count.
///
/// Only a strictly greater count replaces the current leader, so the first
/// proposal to reach the maximum wins a tie. An empty or all-zero tally
/// resolves to index 0, the sentinel proposal.
pub fn winning_proposal<I>(vote_counts: I) -> u64
where
    I: IntoIterator<Item = u64>,
{
    let mut winner = 0u64;
    let mut max_votes = 0u64;
    for (index, votes) in vote_counts.into_iter().enumerate() {
        if votes > max_votes {
            max_votes = votes;
            winner = index as u64;
        }
    }
    winner
}
