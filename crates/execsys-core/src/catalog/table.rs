//! The standard capacity table.
//!
//! Eleven capacities in four clusters. Every capacity lists exactly two
//! interventions per lever, in lever order.

use super::{Capacity, Catalog, Cluster, Intervention};
use crate::types::{CapacityId, InterventionId, Lever};

struct ClusterDef {
    name: &'static str,
    capacities: &'static [CapacityDef],
}

struct CapacityDef {
    id: &'static str,
    name: &'static str,
    question: &'static str,
    low_label: &'static str,
    high_label: &'static str,
    training: [(&'static str, &'static str); 2],
    environment: [(&'static str, &'static str); 2],
    accountability: [(&'static str, &'static str); 2],
}

const CLUSTERS: &[ClusterDef] = &[
    ClusterDef {
        name: "Inhibition & Regulation",
        capacities: &[
            CapacityDef {
                id: "response_inhibition",
                name: "Response Inhibition",
                question: "I can stop myself from acting on impulse, even when I really want to do something.",
                low_label: "I act before thinking",
                high_label: "I pause and choose",
                training: [
                    ("ri_mindfulness", "I practice mindfulness or breathing exercises regularly"),
                    ("ri_urge_surfing", "I use urge-surfing (waiting 60 seconds before acting on impulses)"),
                ],
                environment: [
                    ("ri_notifications", "I've turned off non-essential notifications"),
                    ("ri_friction", "I've added friction to temptations (apps removed, snacks hidden, etc.)"),
                ],
                accountability: [
                    ("ri_blocker", "Someone else controls my app blockers or screen time"),
                    ("ri_body_double", "I work with others present (body doubling, Focusmate)"),
                ],
            },
            CapacityDef {
                id: "emotional_regulation",
                name: "Emotional Regulation",
                question: "I can manage my emotions so they don't derail my work or decisions.",
                low_label: "Emotions overwhelm me",
                high_label: "I stay steady",
                training: [
                    ("er_journaling", "I journal about difficult emotions when they arise"),
                    ("er_labeling", "I practice naming specific emotions (not just 'bad' or 'stressed')"),
                ],
                environment: [
                    ("er_sleep", "I maintain consistent sleep (7-9 hours, fixed wake time)"),
                    ("er_exercise", "I exercise at least 3x per week"),
                ],
                accountability: [
                    ("er_checkin", "I have regular emotional check-ins with someone I trust"),
                    ("er_therapist", "I work with a therapist or counselor"),
                ],
            },
            CapacityDef {
                id: "sustained_attention",
                name: "Sustained Attention",
                question: "I can maintain focus on a task until it's done, without drifting to other things.",
                low_label: "I constantly drift",
                high_label: "I stay locked in",
                training: [
                    ("sa_pomodoro", "I use timed work blocks (Pomodoro, 52-17, etc.)"),
                    ("sa_microreview", "I do brief check-ins during work to catch drift"),
                ],
                environment: [
                    ("sa_one_tab", "I use a single-tab browser or distraction blocker"),
                    ("sa_workspace", "I have a dedicated, distraction-free workspace"),
                ],
                accountability: [
                    ("sa_focusmate", "I use Focusmate or work with a focus partner"),
                    ("sa_timer", "I share a visible timer with someone during work sessions"),
                ],
            },
        ],
    },
    ClusterDef {
        name: "Initiation & Persistence",
        capacities: &[
            CapacityDef {
                id: "task_initiation",
                name: "Task Initiation",
                question: "I can start tasks when I intend to, without needing external pressure or deadlines.",
                low_label: "I wait until last minute",
                high_label: "I start when planned",
                training: [
                    ("ti_two_minute", "I use the two-minute rule (just start for 2 minutes)"),
                    ("ti_visualize", "I visualize the first physical motion before starting"),
                ],
                environment: [
                    ("ti_prep", "I prepare materials the night before"),
                    ("ti_trigger", "I have a consistent start trigger (playlist, location, ritual)"),
                ],
                accountability: [
                    ("ti_start_time", "I commit to specific start times with another person"),
                    ("ti_daily_call", "I have daily planning calls or check-ins"),
                ],
            },
            CapacityDef {
                id: "goal_persistence",
                name: "Goal-Directed Persistence",
                question: "I follow through on long-term goals even when motivation fades or obstacles appear.",
                low_label: "I abandon goals",
                high_label: "I persist through difficulty",
                training: [
                    ("gp_process", "I set process goals, not just outcome goals"),
                    ("gp_why", "I regularly reconnect with WHY my goals matter"),
                ],
                environment: [
                    ("gp_visible", "I have visible progress tracking (streaks, charts, boards)"),
                    ("gp_milestones", "I've broken big goals into clear milestones"),
                ],
                accountability: [
                    ("gp_public", "I've made public commitments about my goals"),
                    ("gp_coach", "I check in regularly with a coach or accountability partner"),
                ],
            },
        ],
    },
    ClusterDef {
        name: "Planning & Organization",
        capacities: &[
            CapacityDef {
                id: "planning",
                name: "Planning & Prioritization",
                question: "I can create realistic plans and identify what's most important to do first.",
                low_label: "I wing it",
                high_label: "I plan systematically",
                training: [
                    ("pl_daily", "I do daily planning (time-blocking my calendar)"),
                    ("pl_weekly", "I do weekly reviews and planning sessions"),
                ],
                environment: [
                    ("pl_calendar", "I use a calendar as my source of truth (not just to-do lists)"),
                    ("pl_eisenhower", "I use a prioritization system (Eisenhower matrix, etc.)"),
                ],
                accountability: [
                    ("pl_review", "Someone reviews my plans with me"),
                    ("pl_witness", "I plan with another person present"),
                ],
            },
            CapacityDef {
                id: "organization",
                name: "Organization",
                question: "I keep my materials, information, and commitments organized and accessible.",
                low_label: "Everything is scattered",
                high_label: "I have reliable systems",
                training: [
                    ("or_reset", "I do end-of-day resets (clearing desk, processing inbox)"),
                    ("or_one_touch", "I practice one-touch rule (handle things once)"),
                ],
                environment: [
                    ("or_single_inbox", "I have a single capture point for new tasks/info"),
                    ("or_taxonomy", "I have consistent folder/filing systems"),
                ],
                accountability: [
                    ("or_photo", "I share workspace photos for accountability"),
                    ("or_audit", "Someone audits my systems with me periodically"),
                ],
            },
            CapacityDef {
                id: "time_awareness",
                name: "Time Awareness",
                question: "I accurately estimate how long things take and manage my time accordingly.",
                low_label: "Time slips away",
                high_label: "I track time well",
                training: [
                    ("ta_estimate", "I estimate task duration, then track actual time to calibrate"),
                    ("ta_body", "I notice body-based time cues (fatigue, hunger)"),
                ],
                environment: [
                    ("ta_visible_time", "I use visible timers and analog clocks"),
                    ("ta_buffer", "I schedule buffer blocks between appointments"),
                ],
                accountability: [
                    ("ta_shared_cal", "I share my calendar with someone who can see my load"),
                    ("ta_deadline", "I report deadlines to an accountability partner"),
                ],
            },
        ],
    },
    ClusterDef {
        name: "Flexibility & Metacognition",
        capacities: &[
            CapacityDef {
                id: "working_memory",
                name: "Working Memory",
                question: "I can hold multiple pieces of information in mind while working with them.",
                low_label: "I forget mid-task",
                high_label: "I hold it all",
                training: [
                    ("wm_external", "I externalize immediately (write everything down)"),
                    ("wm_teach", "I teach material aloud to strengthen retention"),
                ],
                environment: [
                    ("wm_whiteboard", "I use whiteboards or visible dashboards"),
                    ("wm_spaced", "I use spaced repetition tools"),
                ],
                accountability: [
                    ("wm_retrieval", "I practice retrieval with a partner"),
                    ("wm_progress", "I share progress boards with others"),
                ],
            },
            CapacityDef {
                id: "cognitive_flexibility",
                name: "Cognitive Flexibility",
                question: "I can shift strategies when something isn't working and adapt to changes.",
                low_label: "I get stuck",
                high_label: "I adapt easily",
                training: [
                    ("cf_opposite", "I practice arguing the opposite view"),
                    ("cf_reappraise", "I reframe situations multiple ways"),
                ],
                environment: [
                    ("cf_rotate", "I rotate work settings or tools periodically"),
                    ("cf_novelty", "I build in novelty and variety"),
                ],
                accountability: [
                    ("cf_cross", "I get feedback from people outside my domain"),
                    ("cf_peer", "I have peers who challenge my assumptions"),
                ],
            },
            CapacityDef {
                id: "metacognition",
                name: "Metacognition",
                question: "I can observe my own thinking patterns and adjust my approach accordingly.",
                low_label: "I don't notice patterns",
                high_label: "I self-correct",
                training: [
                    ("mc_reflection", "I do daily reflection (what worked, what didn't, lesson)"),
                    ("mc_aar", "I do after-action reviews on projects"),
                ],
                environment: [
                    ("mc_journal", "I use structured journaling templates"),
                    ("mc_ai", "I use AI to help process thoughts and patterns"),
                ],
                accountability: [
                    ("mc_debrief", "I have regular debriefs with a peer or coach"),
                    ("mc_feedback", "I actively seek feedback on my blind spots"),
                ],
            },
        ],
    },
];

/// Materialize the static table into an owned catalog.
pub(super) fn build_standard() -> Catalog {
    let clusters = CLUSTERS
        .iter()
        .map(|cluster| Cluster {
            name: cluster.name.to_string(),
            capacities: cluster
                .capacities
                .iter()
                .map(|def| build_capacity(cluster.name, def))
                .collect(),
        })
        .collect();

    Catalog::new(clusters)
}

fn build_capacity(cluster: &str, def: &CapacityDef) -> Capacity {
    let capacity_id = CapacityId::new(def.id);
    let levers = [
        (Lever::Training, &def.training),
        (Lever::Environment, &def.environment),
        (Lever::Accountability, &def.accountability),
    ];

    let mut interventions = Vec::with_capacity(6);
    for (lever, items) in levers {
        for (id, text) in items {
            interventions.push(Intervention {
                id: InterventionId::new(*id),
                capacity: capacity_id.clone(),
                lever,
                text: (*text).to_string(),
            });
        }
    }

    Capacity {
        id: capacity_id,
        name: def.name.to_string(),
        cluster: cluster.to_string(),
        question: def.question.to_string(),
        low_label: def.low_label.to_string(),
        high_label: def.high_label.to_string(),
        interventions,
    }
}
