//! The contents of each phase file.

use super::{
    Phase,
    command::{Command, Dump, WaitFor},
    step::{Step, StepKind},
};
use crate::plan::TestPlan;

const SEPARATOR: &str = "---\n";

pub(crate) fn step_file(plan: &TestPlan, phase: Phase) -> Result<String, serde_yaml::Error> {
    match phase {
        Phase::Apply => apply(plan),
        Phase::Update => document(phase, &Step::new(StepKind::Step)),
        Phase::Import => document(phase, &import(plan)),
        Phase::Delete => document(phase, &delete(plan)),
    }
}

pub(crate) fn assert_file(plan: &TestPlan, phase: Phase) -> Result<String, serde_yaml::Error> {
    let mut step = Step::new(StepKind::Assert {
        timeout_seconds: plan.effective_timeout_seconds(),
    });
    match phase {
        Phase::Apply => assert_apply(plan, &mut step),
        Phase::Update => assert_update(plan, &mut step),
        Phase::Import => assert_import(plan, &mut step),
        Phase::Delete => assert_delete(plan, &mut step),
    }
    document(phase, &step)
}

fn document(phase: Phase, step: &Step) -> Result<String, serde_yaml::Error> {
    let mut out = header(phase, step_kind_label(step));
    out.push_str(&step.to_yaml()?);
    Ok(out)
}

fn step_kind_label(step: &Step) -> &'static str {
    if step.is_assert() { "assert file" } else { "file" }
}

fn header(phase: Phase, label: &str) -> String {
    format!("# This {label} belongs to the resource {} step.\n", phase.name())
}

fn apply(plan: &TestPlan) -> Result<String, serde_yaml::Error> {
    let mut out = header(Phase::Apply, "file");
    if let Some(setup) = plan.setup_script() {
        let mut step = Step::new(StepKind::Step);
        step.push(Command::Run(setup));
        out.push_str(&step.to_yaml()?);
    }
    for resource in plan.resources() {
        out.push_str(SEPARATOR);
        out.push_str(&resource.manifest_text);
        if !resource.manifest_text.ends_with('\n') {
            out.push('\n');
        }
    }
    Ok(out)
}

fn assert_apply(plan: &TestPlan, step: &mut Step) {
    step.push(Command::AnnotateTestMarker);
    dumps(step, "apply", true);
    for resource in plan.subjects() {
        if let Some(path) = &resource.hooks.pre_assert {
            step.push(Command::Hook {
                label: "pre-assert",
                path,
            });
        }
        step.extend(resource.conditions.iter().map(|condition| Command::Wait {
            resource,
            wait_for: WaitFor::Condition(condition),
        }));
        if let Some(path) = &resource.hooks.post_assert {
            step.push(Command::Hook {
                label: "post-assert",
                path,
            });
        }
    }
}

fn assert_update(plan: &TestPlan, step: &mut Step) {
    dumps(step, "update", false);
    for resource in plan.subjects() {
        if let Some(assertion) = &resource.update_assertion {
            step.push(Command::AssertUpdated {
                resource,
                assertion,
            });
        }
    }
}

fn import(plan: &TestPlan) -> Step {
    let mut step = Step::new(StepKind::Step);
    let mut targets = plan.import_targets().peekable();
    if targets.peek().is_none() {
        return step;
    }

    step.push(Command::ScaleCrossplane { replicas: 0 });
    step.push(Command::ScaleProviders { replicas: 0 });
    for resource in targets {
        step.push(Command::StoreExternalId(resource));
        step.push(Command::ClearConditions(resource));
    }
    step.push(Command::ScaleCrossplane { replicas: 1 });
    step.push(Command::ScaleProviders { replicas: 1 });
    step
}

fn assert_import(plan: &TestPlan, step: &mut Step) {
    dumps(step, "import", false);
    for resource in plan.import_targets() {
        if let Some(condition) = resource.conditions.first() {
            step.push(Command::Wait {
                resource,
                wait_for: WaitFor::Condition(condition),
            });
        }
        step.push(Command::AssertExternalId(resource));
    }
}

fn delete(plan: &TestPlan) -> Step {
    let mut step = Step::new(StepKind::Step);
    for resource in plan.subjects().rev() {
        if let Some(path) = &resource.hooks.pre_delete {
            step.push(Command::Hook {
                label: "pre-delete",
                path,
            });
        }
        step.push(Command::Delete(resource));
        if let Some(path) = &resource.hooks.post_delete {
            step.push(Command::Hook {
                label: "post-delete",
                path,
            });
        }
    }
    step.push(Command::DeleteAll {
        marked_only: plan.only_clean_uptest_resources(),
    });
    step
}

fn assert_delete(plan: &TestPlan, step: &mut Step) {
    dumps(step, "delete", true);
    step.extend(plan.subjects().map(|resource| Command::Wait {
        resource,
        wait_for: WaitFor::Delete,
    }));
    step.push(Command::WaitAllDeleted {
        timeout_seconds: plan.effective_timeout_seconds(),
        marked_only: plan.only_clean_uptest_resources(),
    });
    if let Some(teardown) = plan.teardown_script() {
        step.push(Command::Run(teardown));
    }
}

fn dumps(step: &mut Step, phase: &'static str, with_claims: bool) {
    step.push(Command::Dump {
        dump: Dump::Managed,
        phase,
    });
    if with_claims {
        step.push(Command::Dump {
            dump: Dump::Claims,
            phase,
        });
    }
}
