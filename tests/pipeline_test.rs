mod common;

use common::{plan_json, test_config, ScriptedGateway};
use course_generator::{AppError, CoursePipeline, RawText, SubtopicFailurePolicy};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

const SORTING_TEXT: &str = "Sorting algorithms arrange elements. Bubble sort swaps adjacent \
elements. Merge sort divides and merges. Quicksort partitions around a pivot.";

fn sorting_plan() -> String {
    plan_json(&[
        ("Simple sorts", &["Bubble sort", "Insertion sort"]),
        ("Divide and conquer", &["Merge sort", "Quicksort"]),
    ])
}

#[tokio::test(start_paused = true)]
async fn test_sorting_course_end_to_end() {
    let gateway = Arc::new(ScriptedGateway::new(sorting_plan()));
    let pipeline = CoursePipeline::new(gateway.clone(), &test_config());

    let run = pipeline
        .generate(&RawText::new(SORTING_TEXT, 10_000))
        .await
        .unwrap();

    assert_eq!(run.course.modules.len(), 2);
    let titles: Vec<_> = run
        .course
        .modules
        .iter()
        .flat_map(|m| m.subtopics.iter().map(|s| s.title.as_str()))
        .collect();
    for expected in ["Bubble sort", "Merge sort", "Quicksort"] {
        assert!(titles.contains(&expected), "missing {}", expected);
    }

    for subtopic in run.course.modules.iter().flat_map(|m| &m.subtopics) {
        let notes = subtopic.detailed_notes_md.as_deref().unwrap_or_default();
        assert!(!notes.trim().is_empty());
        assert!((3..=5).contains(&subtopic.quiz_questions.len()));
        for q in &subtopic.quiz_questions {
            assert!(q.options.contains(&q.answer));
        }
    }

    assert_eq!(run.stats.modules, 2);
    assert_eq!(run.stats.subtopics, 4);
    assert_eq!(run.stats.quiz_questions, 12);
    assert_eq!(run.stats.degraded_subtopics, 0);
    assert_eq!(gateway.plan_calls.load(Ordering::SeqCst), 1);
    assert_eq!(gateway.notes_calls.load(Ordering::SeqCst), 4);
    assert_eq!(gateway.quiz_calls.load(Ordering::SeqCst), 4);
}

#[tokio::test(start_paused = true)]
async fn test_output_keeps_plan_order_when_first_subtopic_is_slowest() {
    let plan = plan_json(&[("Sorting", &["Bubble sort", "Merge sort", "Quicksort"])]);
    let gateway = Arc::new(
        ScriptedGateway::new(plan).with_delay("Bubble sort", Duration::from_millis(500)),
    );
    let pipeline = CoursePipeline::new(gateway.clone(), &test_config());

    let run = pipeline
        .generate(&RawText::new(SORTING_TEXT, 10_000))
        .await
        .unwrap();

    // 第一个子主题最后完成
    let ends: Vec<_> = gateway
        .events()
        .into_iter()
        .filter(|e| e.starts_with("end:"))
        .collect();
    assert_eq!(ends.last().map(String::as_str), Some("end:Bubble sort"));

    let titles: Vec<_> = run.course.modules[0]
        .subtopics
        .iter()
        .map(|s| s.title.clone())
        .collect();
    assert_eq!(titles, vec!["Bubble sort", "Merge sort", "Quicksort"]);
}

#[tokio::test(start_paused = true)]
async fn test_modules_run_one_after_another() {
    let gateway = Arc::new(
        ScriptedGateway::new(sorting_plan())
            .with_delay("Insertion sort", Duration::from_millis(300)),
    );
    let pipeline = CoursePipeline::new(gateway.clone(), &test_config());

    pipeline
        .generate(&RawText::new(SORTING_TEXT, 10_000))
        .await
        .unwrap();

    let events = gateway.events();
    let position = |event: &str| events.iter().position(|e| e == event).unwrap();

    // 第二个模块的子主题要等第一个模块全部结束（包括测验）才开始
    let first_module_done = position("quiz:Bubble sort").max(position("quiz:Insertion sort"));
    assert!(position("start:Merge sort") > first_module_done);
    assert!(position("start:Quicksort") > first_module_done);
}

#[tokio::test(start_paused = true)]
async fn test_plan_failure_aborts_before_any_subtopic() {
    let gateway = Arc::new(ScriptedGateway::failing_plan());
    let config = course_generator::Config {
        max_retry_attempts: 5,
        ..test_config()
    };
    let pipeline = CoursePipeline::new(gateway.clone(), &config);

    let err = pipeline
        .generate(&RawText::new(SORTING_TEXT, 10_000))
        .await
        .unwrap_err();

    match err {
        AppError::RetryExhausted(e) => assert_eq!(e.attempts, 5),
        other => panic!("unexpected error: {}", other),
    }
    assert_eq!(gateway.plan_calls.load(Ordering::SeqCst), 5);
    assert_eq!(gateway.notes_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_failed_subtopic_fails_run_after_batch_settles() {
    let gateway = Arc::new(ScriptedGateway::new(sorting_plan()).with_failing_notes("Bubble sort"));
    let pipeline = CoursePipeline::new(gateway.clone(), &test_config());

    let err = pipeline
        .generate(&RawText::new(SORTING_TEXT, 10_000))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::RetryExhausted(_)));
    // 同一模块的其他子主题照常完成，后续模块不再开始
    let events = gateway.events();
    assert!(events.contains(&"quiz:Insertion sort".to_string()));
    assert!(!events.iter().any(|e| e.contains("Merge sort")));
}

#[tokio::test(start_paused = true)]
async fn test_degrade_policy_keeps_going() {
    let gateway = Arc::new(
        ScriptedGateway::new(sorting_plan())
            .with_failing_notes("Bubble sort")
            .with_failing_quiz("Quicksort"),
    );
    let config = course_generator::Config {
        subtopic_failure_policy: SubtopicFailurePolicy::Degrade,
        ..test_config()
    };
    let pipeline = CoursePipeline::new(gateway, &config);

    let run = pipeline
        .generate(&RawText::new(SORTING_TEXT, 10_000))
        .await
        .unwrap();

    assert_eq!(run.stats.degraded_subtopics, 2);
    assert_eq!(run.stats.subtopics, 4);

    let bubble = &run.course.modules[0].subtopics[0];
    assert!(bubble.detailed_notes_md.is_none());
    assert!(bubble.quiz_questions.is_empty());

    let quicksort = &run.course.modules[1].subtopics[1];
    assert!(quicksort.detailed_notes_md.is_some());
    assert!(quicksort.quiz_questions.is_empty());
}

#[tokio::test]
async fn test_blank_input_is_rejected_without_model_calls() {
    let gateway = Arc::new(ScriptedGateway::new(sorting_plan()));
    let pipeline = CoursePipeline::new(gateway.clone(), &test_config());

    let err = pipeline
        .generate(&RawText::new("   \n", 10_000))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::InvalidInput(_)));
    assert_eq!(gateway.plan_calls.load(Ordering::SeqCst), 0);
}
