//! Static reference data the synthesizer draws from.

#[derive(Debug, Clone, Copy)]
pub struct RosterEntry {
    pub display_name: &'static str,
    pub handle: &'static str,
    pub verified: bool,
    pub follower_count: u64,
    pub avatar_ref: &'static str,
}

/// Higher-reach accounts.
pub const INFLUENTIAL: &[RosterEntry] = &[
    RosterEntry {
        display_name: "Vitalik Buterin",
        handle: "VitalikButerin",
        verified: true,
        follower_count: 5_200_000,
        avatar_ref: "https://pbs.twimg.com/profile_images/977496875887558661/L86xyLF4_400x400.jpg",
    },
    RosterEntry {
        display_name: "Keone Hon",
        handle: "keone_hon",
        verified: true,
        follower_count: 45_200,
        avatar_ref: "https://pbs.twimg.com/profile_images/1590438884339777536/LJRZDAFn_400x400.jpg",
    },
    RosterEntry {
        display_name: "Pseudotheos",
        handle: "pseudotheos",
        verified: true,
        follower_count: 89_400,
        avatar_ref: "https://pbs.twimg.com/profile_images/1590476622347935744/sMSYr_Xq_400x400.jpg",
    },
    RosterEntry {
        display_name: "Cobie",
        handle: "cobie",
        verified: true,
        follower_count: 892_000,
        avatar_ref: "https://pbs.twimg.com/profile_images/1479226215605473285/V0vyYbWm_400x400.jpg",
    },
    RosterEntry {
        display_name: "Ansem",
        handle: "blknoiz06",
        verified: true,
        follower_count: 567_000,
        avatar_ref: "https://pbs.twimg.com/profile_images/1613654818312900608/ULgPoQlY_400x400.jpg",
    },
    RosterEntry {
        display_name: "Delphi Digital",
        handle: "Delphi_Digital",
        verified: true,
        follower_count: 234_000,
        avatar_ref: "https://pbs.twimg.com/profile_images/1658921838091689984/BcQvfDZO_400x400.jpg",
    },
    RosterEntry {
        display_name: "Messari",
        handle: "MessariCrypto",
        verified: true,
        follower_count: 445_000,
        avatar_ref: "https://pbs.twimg.com/profile_images/1059441429212532736/OgeMT-pD_400x400.jpg",
    },
    RosterEntry {
        display_name: "Bankless",
        handle: "BanklessHQ",
        verified: true,
        follower_count: 678_000,
        avatar_ref: "https://pbs.twimg.com/profile_images/1639698578141736960/bVHJEPGE_400x400.jpg",
    },
    RosterEntry {
        display_name: "DefiLlama",
        handle: "DefiLlama",
        verified: true,
        follower_count: 123_000,
        avatar_ref: "https://pbs.twimg.com/profile_images/1377170621616099329/qmRyPIpP_400x400.jpg",
    },
    RosterEntry {
        display_name: "Polynya",
        handle: "epolynya",
        verified: true,
        follower_count: 98_000,
        avatar_ref: "https://pbs.twimg.com/profile_images/1517390094176493568/wZ_uLAg4_400x400.jpg",
    },
];

pub const REGULAR: &[RosterEntry] = &[
    RosterEntry {
        display_name: "Alex Chen",
        handle: "alexc_crypto",
        verified: false,
        follower_count: 12_400,
        avatar_ref: "https://pbs.twimg.com/profile_images/1485050791488483328/UNJ05AV8_400x400.jpg",
    },
    RosterEntry {
        display_name: "Sarah Williams",
        handle: "sarahw_defi",
        verified: false,
        follower_count: 8_900,
        avatar_ref: "https://pbs.twimg.com/profile_images/1493396441521491970/R5_wzm1t_400x400.jpg",
    },
    RosterEntry {
        display_name: "Mike Rodriguez",
        handle: "mike_blockchain",
        verified: false,
        follower_count: 15_600,
        avatar_ref: "https://pbs.twimg.com/profile_images/1499124402254716929/g5KwGwLA_400x400.jpg",
    },
    RosterEntry {
        display_name: "Emma Thompson",
        handle: "emma_web3",
        verified: false,
        follower_count: 6_700,
        avatar_ref: "https://pbs.twimg.com/profile_images/1489673402350227457/Q9aHYtB0_400x400.jpg",
    },
    RosterEntry {
        display_name: "David Kim",
        handle: "davidk_eth",
        verified: false,
        follower_count: 23_400,
        avatar_ref: "https://pbs.twimg.com/profile_images/1511899736033689600/QJukgj3t_400x400.jpg",
    },
    RosterEntry {
        display_name: "Lisa Zhang",
        handle: "lisa_crypto",
        verified: false,
        follower_count: 9_800,
        avatar_ref: "https://pbs.twimg.com/profile_images/1502345152368369665/QVOQgLfg_400x400.jpg",
    },
    RosterEntry {
        display_name: "James Wilson",
        handle: "jameswilson_",
        verified: false,
        follower_count: 4_500,
        avatar_ref: "https://pbs.twimg.com/profile_images/1507745190021234689/ZTFX35QZ_400x400.jpg",
    },
    RosterEntry {
        display_name: "Maria Garcia",
        handle: "maria_defi",
        verified: false,
        follower_count: 11_200,
        avatar_ref: "https://pbs.twimg.com/profile_images/1498765390935719936/5X9xDTZ0_400x400.jpg",
    },
    RosterEntry {
        display_name: "Tom Anderson",
        handle: "tom_blockchain",
        verified: false,
        follower_count: 7_800,
        avatar_ref: "https://pbs.twimg.com/profile_images/1505248657137442817/vz5j2Fla_400x400.jpg",
    },
    RosterEntry {
        display_name: "Rachel Brown",
        handle: "rachel_web3",
        verified: false,
        follower_count: 13_900,
        avatar_ref: "https://pbs.twimg.com/profile_images/1491823980944769025/QDc_BkF7_400x400.jpg",
    },
    RosterEntry {
        display_name: "Kevin Lee",
        handle: "kevin_crypto",
        verified: false,
        follower_count: 5_600,
        avatar_ref: "https://pbs.twimg.com/profile_images/1509876111741739008/2hHyHvbd_400x400.jpg",
    },
    RosterEntry {
        display_name: "Sophie Martin",
        handle: "sophie_eth",
        verified: false,
        follower_count: 8_200,
        avatar_ref: "https://pbs.twimg.com/profile_images/1497654352488407040/DPpQ6bM4_400x400.jpg",
    },
    RosterEntry {
        display_name: "Chris Taylor",
        handle: "chris_defi",
        verified: false,
        follower_count: 16_700,
        avatar_ref: "https://pbs.twimg.com/profile_images/1503487031891984384/JvRnf9Zy_400x400.jpg",
    },
    RosterEntry {
        display_name: "Anna Johnson",
        handle: "anna_blockchain",
        verified: false,
        follower_count: 3_400,
        avatar_ref: "https://pbs.twimg.com/profile_images/1495738019216023553/N5-nR3fW_400x400.jpg",
    },
    RosterEntry {
        display_name: "Ryan Davis",
        handle: "ryan_web3",
        verified: false,
        follower_count: 9_100,
        avatar_ref: "https://pbs.twimg.com/profile_images/1501234652615680000/MGcYZ2Xj_400x400.jpg",
    },
];

pub const POSITIVE_BODIES: &[&str] = &[
    "Excited to see @monad_xyz pushing the boundaries of parallel execution! The 10,000+ TPS benchmarks are incredible 🚀 #MonadLabs",
    "Just read the @monad_xyz whitepaper and I'm blown away by their approach to EVM compatibility with parallel processing. This could be a game changer! 💯",
    "@monad_xyz is solving one of the biggest challenges in blockchain - scalability without sacrificing decentralization. Bullish! 📈",
    "The team behind @monad_xyz has some serious talent. Their parallel execution model is exactly what the industry needs right now 🔥",
    "Finally, a blockchain that can handle real-world adoption! @monad_xyz's architecture is revolutionary 🌟",
    "Been following @monad_xyz development and their progress is impressive. Can't wait to see this in production! 💪",
    "@monad_xyz testnet performance is mind-blowing. 10k TPS with full EVM compatibility? Sign me up! 🚀",
    "The innovation happening at @monad_xyz is next level. Parallel execution done right! 👏",
    "@monad_xyz is going to change everything. Their approach to consensus and execution is brilliant 🧠",
    "Huge fan of what @monad_xyz is building. The future of high-performance blockchains is here! ⚡",
    "Just deployed my first contract on @monad_xyz testnet. The speed is unreal! 🏃‍♂️💨",
    "@monad_xyz team continues to deliver. Their technical deep dives are always insightful 📚",
    "The parallel execution model of @monad_xyz is a masterpiece of engineering 🎯",
    "Impressed by @monad_xyz's commitment to maintaining EVM compatibility while achieving massive scale 🔧",
    "@monad_xyz is setting new standards for blockchain performance. Excited for mainnet! 🎉",
];

pub const NEUTRAL_BODIES: &[&str] = &[
    "Interesting technical approach by @monad_xyz on parallel execution. Will be curious to see how it performs at scale.",
    "Reading about @monad_xyz's consensus mechanism. The parallel processing design is complex but potentially powerful.",
    "@monad_xyz announced their latest testnet results. 10k TPS is impressive if it can maintain decentralization.",
    "The @monad_xyz team published a new technical blog post about their execution model. Worth a read for blockchain devs.",
    "Comparing different L1 solutions and @monad_xyz's parallel execution approach stands out as unique.",
    "@monad_xyz testnet is live. Testing some basic transactions to see how the parallel execution works in practice.",
    "Attended a presentation about @monad_xyz architecture. The technical details are quite sophisticated.",
    "@monad_xyz's approach to state management in parallel execution is an interesting engineering challenge.",
    "Looking at the @monad_xyz codebase. The implementation of parallel consensus is well thought out.",
    "The @monad_xyz whitepaper discusses some novel approaches to blockchain scalability. Technical but informative.",
    "@monad_xyz team shared updates on their progress. Development seems to be moving steadily forward.",
    "Analyzing the trade-offs in @monad_xyz's design choices. Interesting balance between performance and decentralization.",
    "@monad_xyz's parallel execution model raises some questions about MEV and transaction ordering.",
    "The @monad_xyz testnet metrics show promising results. Will be interesting to see mainnet performance.",
    "Discussing @monad_xyz's technical architecture with other developers. Lots of interesting design decisions.",
];

pub const NEGATIVE_BODIES: &[&str] = &[
    "Still skeptical about @monad_xyz's claims. Parallel execution sounds good in theory but implementation challenges are real.",
    "Concerned about the complexity of @monad_xyz's parallel consensus. More complexity usually means more attack vectors.",
    "@monad_xyz's 10k TPS claims need more independent verification. Testnet conditions are very different from mainnet.",
    "The @monad_xyz approach seems to sacrifice some decentralization for performance. Not sure if that's the right trade-off.",
    "Worried about the centralization risks in @monad_xyz's validator set. High performance often comes at a cost.",
    "@monad_xyz's parallel execution model might face issues with complex smart contract interactions.",
    "The @monad_xyz team hasn't addressed some key concerns about MEV and front-running in their parallel model.",
    "Skeptical about @monad_xyz's ability to maintain EVM compatibility with such aggressive parallelization.",
    "@monad_xyz's consensus mechanism seems overly complex. Simpler solutions often prove more robust long-term.",
    "The @monad_xyz testnet results look good but I'm waiting to see how it handles real-world stress testing.",
    "Concerned about the hardware requirements for @monad_xyz validators. Could lead to centralization.",
    "@monad_xyz's parallel execution might create new types of bugs and vulnerabilities we haven't seen before.",
    "The @monad_xyz economic model for validators seems unclear. Tokenomics need more transparency.",
    "While @monad_xyz's tech is impressive, I'm worried about the practical challenges of parallel state management.",
    "The @monad_xyz approach to handling transaction dependencies in parallel execution seems problematic.",
];

/// Compose-intent messages offered by the dashboard.
pub const PROMO_TEMPLATES: &[&str] = &[
    "Just discovered @monad_xyz and I'm impressed by their parallel execution architecture! 10,000+ TPS with full EVM compatibility is a game changer for blockchain scalability. 🚀 #MonadLabs #Blockchain",
    "Excited about the future of blockchain with @monad_xyz! Their approach to parallel execution while maintaining EVM compatibility is exactly what the industry needs. 💯 #MonadLabs",
    "The team at @monad_xyz is solving one of the biggest challenges in blockchain - scalability without sacrificing decentralization. Bullish on their technology! 📈 #MonadLabs",
    "Been following @monad_xyz development and their progress is impressive. Can't wait to see their parallel execution model in production! 💪 #MonadLabs #Blockchain",
    "@monad_xyz testnet performance is mind-blowing. 10k TPS with full EVM compatibility is the breakthrough we've been waiting for! ⚡ #MonadLabs",
    "The innovation happening at @monad_xyz is next level. Their parallel execution architecture is brilliantly designed! 🧠 #MonadLabs #Blockchain",
    "Just read the @monad_xyz whitepaper and I'm blown away by their approach to blockchain scalability. This could revolutionize the entire ecosystem! 🔥 #MonadLabs",
    "Impressed by @monad_xyz's commitment to maintaining EVM compatibility while achieving massive scale. The future of high-performance blockchains is here! 🚀 #MonadLabs",
];

pub fn roster_len() -> usize {
    INFLUENTIAL.len() + REGULAR.len()
}

/// Index into the combined roster, influential tier first.
pub fn roster_entry(index: usize) -> Option<&'static RosterEntry> {
    if index < INFLUENTIAL.len() {
        INFLUENTIAL.get(index)
    } else {
        REGULAR.get(index - INFLUENTIAL.len())
    }
}

pub fn find_by_handle(handle: &str) -> Option<&'static RosterEntry> {
    let bare = handle.trim_start_matches('@');
    INFLUENTIAL
        .iter()
        .chain(REGULAR.iter())
        .find(|entry| entry.handle.eq_ignore_ascii_case(bare))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::MENTION_TOKEN;

    #[test]
    fn every_body_mentions_the_handle_once() {
        for body in POSITIVE_BODIES
            .iter()
            .chain(NEUTRAL_BODIES)
            .chain(NEGATIVE_BODIES)
        {
            assert_eq!(body.matches(MENTION_TOKEN).count(), 1, "{body}");
        }
    }

    #[test]
    fn pools_are_disjoint() {
        for body in POSITIVE_BODIES {
            assert!(!NEUTRAL_BODIES.contains(body));
            assert!(!NEGATIVE_BODIES.contains(body));
        }
        for body in NEUTRAL_BODIES {
            assert!(!NEGATIVE_BODIES.contains(body));
        }
    }

    #[test]
    fn influential_tier_outranks_regular_tier() {
        let weakest_influential = INFLUENTIAL.iter().map(|e| e.follower_count).min().unwrap();
        let strongest_regular = REGULAR.iter().map(|e| e.follower_count).max().unwrap();
        assert!(weakest_influential > strongest_regular);
        assert!(REGULAR.iter().all(|entry| !entry.verified));
    }

    #[test]
    fn combined_index_walks_both_tiers() {
        assert_eq!(roster_len(), 25);
        assert_eq!(roster_entry(0).unwrap().handle, "VitalikButerin");
        assert_eq!(roster_entry(10).unwrap().handle, "alexc_crypto");
        assert!(roster_entry(25).is_none());
        assert_eq!(find_by_handle("@cobie").unwrap().follower_count, 892_000);
    }
}
