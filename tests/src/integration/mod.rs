mod checkpoint_overtake;
mod crash_replay;
mod vrf_mismatch_reorg;
