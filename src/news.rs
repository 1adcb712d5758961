use rand::Rng;

const HEADLINE_COUNT: usize = 3;

/// Simulated press lines for the news pane. Purely decorative feed; no
/// network involved.
pub fn latest_news(player_name: &str, rng: &mut impl Rng) -> Vec<String> {
    let name = player_name.trim();
    if name.is_empty() {
        return vec!["Enter a player name to get news.".to_string()];
    }

    let pool = [
        format!("Sources say {name} completed a full training session yesterday."),
        "Manager praises player's work ethic in recent press conference.".to_string(),
        format!("Speculation about a minor knock for {name} dismissed by the club."),
        format!("{name} seen working with the conditioning staff after the session."),
        "Medical staff report squad availability at a season high.".to_string(),
        format!("Supporters' poll rates {name} among the fittest in the squad."),
    ];

    let mut picked: Vec<usize> = Vec::with_capacity(HEADLINE_COUNT);
    while picked.len() < HEADLINE_COUNT {
        let idx = rng.gen_range(0..pool.len());
        if !picked.contains(&idx) {
            picked.push(idx);
        }
    }
    picked.into_iter().map(|idx| pool[idx].clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn empty_name_prompts_for_one() {
        let mut rng = StdRng::seed_from_u64(7);
        let lines = latest_news("  ", &mut rng);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("Enter a player name"));
    }

    #[test]
    fn named_player_gets_three_distinct_lines() {
        let mut rng = StdRng::seed_from_u64(7);
        let lines = latest_news("John Doe", &mut rng);
        assert_eq!(lines.len(), 3);
        let mut unique = lines.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), 3);
    }
}
